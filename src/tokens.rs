use regex::Regex;
use std::sync::OnceLock;

use crate::context::RenderContext;

/// Remote storage location icon paths resolve against when they are neither
/// absolute URLs nor site-root paths. Process-wide constant, never mutated.
pub const ICON_STORAGE_BASE: &str = "https://files.storytext.app/storage/v1/object/public/icons/";

/// CSS class applied to inline story icons for consistent sizing
pub const ICON_CLASS: &str = "story-icon";

/// CSS class applied to the hero image emitted for BIGICON tokens
pub const BIGICON_CLASS: &str = "story-bigicon";

// ─── Expansion ───────────────────────────────────────────────────────────────

/// Expand every recognized token in `content` against `ctx`.
///
/// Replacement is string-level — the source data frequently carries legacy or
/// intentionally unbalanced markup that a strict HTML parser would mangle.
/// Unrecognized tokens and unterminated block tokens pass through verbatim.
pub fn expand_tokens(content: &str, ctx: &RenderContext) -> String {
    let now = ctx.timestamp();
    let date = now.format("%b %-d, %Y").to_string();
    let time = now.format("%-I:%M %p").to_string();
    let year = now.format("%Y").to_string();

    let meta = ctx.story.clone().unwrap_or_default();

    let expanded = content
        .replace("{{DATE}}", &date)
        .replace("{{TIME}}", &time)
        .replace("{{YEAR}}", &year)
        .replace("{{ThisYear}}", &year)
        .replace("{{PID}}", &ctx.masked_pid())
        .replace("{{STORY_TITLE}}", meta.title.as_deref().unwrap_or(""))
        .replace("{{STORY_CODE}}", meta.story_code.as_deref().unwrap_or(""))
        .replace("{{AUTHOR}}", meta.author.as_deref().unwrap_or(""))
        .replace("{{CATEGORY}}", meta.category.as_deref().unwrap_or(""));

    let expanded = expand_icons(&expanded);
    expand_bigicons(&expanded)
}

fn expand_icons(content: &str) -> String {
    let with_blocks = icon_block_re()
        .replace_all(content, |caps: &regex::Captures| {
            icon_img(&caps[1], ICON_CLASS)
        })
        .into_owned();
    icon_colon_re()
        .replace_all(&with_blocks, |caps: &regex::Captures| {
            icon_img(&caps[1], ICON_CLASS)
        })
        .into_owned()
}

fn expand_bigicons(content: &str) -> String {
    let mut out = bigicon_block_re()
        .replace_all(content, |caps: &regex::Captures| {
            icon_img(&caps[1], BIGICON_CLASS)
        })
        .into_owned();
    out = bigicon_colon_re()
        .replace_all(&out, |caps: &regex::Captures| {
            icon_img(&caps[1], BIGICON_CLASS)
        })
        .into_owned();
    bigicon_bare_re()
        .replace_all(&out, |caps: &regex::Captures| {
            icon_img(&caps[1], BIGICON_CLASS)
        })
        .into_owned()
}

/// Extract the hero image path from content, trying the three accepted
/// BIGICON spellings in priority order: block, colon, bare assignment.
/// The first non-empty match wins. The returned path is already resolved
/// against [`ICON_STORAGE_BASE`] where needed.
pub fn extract_bigicon(content: &str) -> Option<String> {
    for re in [bigicon_block_re(), bigicon_colon_re(), bigicon_bare_re()] {
        if let Some(caps) = re.captures(content) {
            let path = caps[1].trim();
            if !path.is_empty() {
                return Some(resolve_icon_path(path));
            }
        }
    }
    None
}

// ─── Icon path resolution ────────────────────────────────────────────────────

/// Resolve an icon path to a displayable image reference.
///
/// Absolute URLs and site-root paths are used as-is; anything else is joined
/// to the fixed remote icon storage location.
pub fn resolve_icon_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}{}", ICON_STORAGE_BASE, path)
    }
}

fn icon_img(path: &str, class: &str) -> String {
    let src = resolve_icon_path(path).replace('"', "&quot;");
    format!(r#"<img src="{}" class="{}" alt="">"#, src, class)
}

// ─── Patterns ────────────────────────────────────────────────────────────────
//
// Block forms require a balanced closing tag; an unterminated {{ICON}} stays
// literal rather than being guessed at.

fn icon_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{ICON\}\}\s*([^{}]+?)\s*\{\{/ICON\}\}").expect("valid icon pattern")
    })
}

fn icon_colon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{ICON:\s*([^{}]+?)\s*\}\}").expect("valid icon pattern")
    })
}

fn bigicon_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{BIGICON\}\}\s*([^{}]+?)\s*\{\{/BIGICON\}\}").expect("valid bigicon pattern")
    })
}

fn bigicon_colon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{BIGICON:\s*([^{}]+?)\s*\}\}").expect("valid bigicon pattern")
    })
}

fn bigicon_bare_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Legacy web-form content carries CRLF line endings; multi-line `$`
        // only matches before `\n`, so the `\r` has to be consumed explicitly.
        Regex::new(r"(?m)^BIGICON\s*=\s*(\S[^\r\n]*)\r?$").expect("valid bigicon pattern")
    })
}
