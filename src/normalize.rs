use regex::Regex;
use std::sync::OnceLock;

// ─── Paragraph wrapping ──────────────────────────────────────────────────────

/// Wrap plain text in paragraph elements.
///
/// Content that already contains a `<p>` tag is returned untouched —
/// author-provided structure is authoritative. Otherwise the text is split on
/// runs of two or more line breaks (literal `<br>` tags count as breaks),
/// empty segments are dropped, and each remaining segment gets its own `<p>`.
pub fn wrap_paragraphs(content: &str) -> String {
    if has_paragraph_tag(content) {
        return content.to_string();
    }

    let paragraphs: Vec<String> = paragraph_break_re()
        .split(content)
        .map(str::trim)
        .filter(|seg| !seg.is_empty())
        .map(|seg| format!("<p>{}</p>", seg))
        .collect();

    paragraphs.join("\n")
}

fn has_paragraph_tag(content: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<p[\s>/]").expect("valid paragraph pattern"))
        .is_match(content)
}

fn paragraph_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:[ \t]*(?:\r?\n|<br[^>]*>)){2,}[ \t]*").expect("valid break pattern")
    })
}

// ─── Editor-div cleaning ─────────────────────────────────────────────────────

/// Convert rich-text-editor `<div>` wrappers to paragraphs.
///
/// Divs with non-empty text content become `<p>`, keeping only
/// layout-relevant inline styles (text-align, margin, padding) so a single
/// stylesheet governs typography. Empty divs are dropped; a div whose only
/// content is markup keeps its children unwrapped. Shallow single pass, not
/// a general HTML rewriter.
pub fn clean_editor_divs(content: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?is)<div(\s[^>]*)?>(.*?)</div>"#).expect("valid div pattern")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let inner = &caps[2];

        if !strip_tags(inner).trim().is_empty() {
            let kept = extract_style_attr(attrs)
                .map(|style| filter_layout_styles(&style))
                .unwrap_or_default();
            if kept.is_empty() {
                format!("<p>{}</p>", inner)
            } else {
                format!(r#"<p style="{}">{}</p>"#, kept, inner)
            }
        } else if inner.contains('<') {
            inner.to_string()
        } else {
            String::new()
        }
    })
    .into_owned()
}

fn extract_style_attr(attrs: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)style\s*=\s*"([^"]*)""#).expect("valid style pattern"))
        .captures(attrs)
        .map(|caps| caps[1].to_string())
}

/// Keep only layout-relevant declarations from an inline style string.
/// Font and color declarations are discarded.
pub fn filter_layout_styles(style: &str) -> String {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            let keep = prop == "text-align"
                || prop == "margin"
                || prop.starts_with("margin-")
                || prop == "padding"
                || prop.starts_with("padding-");
            if keep && !value.is_empty() {
                Some(format!("{}: {}", prop, value))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// ─── Tag stripping ───────────────────────────────────────────────────────────

/// Remove all markup from an HTML string, leaving plain text.
///
/// Script and style elements are dropped with their content; every other tag
/// is removed and its text kept. Dependency-free so word counting works
/// outside a browser context.
pub fn strip_tags(html: &str) -> String {
    strip_tags_with(html, "")
}

/// Count the words in an HTML string, ignoring markup.
/// Tags are treated as word boundaries so adjacent blocks do not fuse.
pub fn word_count(html: &str) -> usize {
    strip_tags_with(html, " ").split_whitespace().count()
}

fn strip_tags_with(html: &str, tag_replacement: &str) -> String {
    static CONTENT_TAGS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();

    let without_blocks = CONTENT_TAGS
        .get_or_init(|| {
            Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>")
                .expect("valid content tag pattern")
        })
        .replace_all(html, "");

    let text = TAGS
        .get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"))
        .replace_all(&without_blocks, tag_replacement);

    decode_basic_entities(&text)
}

fn decode_basic_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
