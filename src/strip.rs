use regex::Regex;
use std::sync::OnceLock;

/// Obsolete header-metadata tokens. Their content now lives in dedicated
/// database columns and must not leak into a rendered body.
const LEGACY_TOKENS: &[&str] = &["TITLE", "TAGLINE", "AUTHOR", "EXCERPT", "BIGICON"];

/// Header-metadata blocks the render pipeline removes before token expansion.
/// BIGICON is excluded here because its block form is still a live token.
const HEADER_TOKENS: &[&str] = &["TITLE", "TAGLINE", "AUTHOR", "EXCERPT"];

/// Remove every legacy header token block and its enclosed content.
///
/// Handles the bare form and the variant wrapped in one enclosing tag.
/// Leftover multi-blank-line runs collapse to a single blank line, and the
/// result is trimmed. Idempotent: stripping twice equals stripping once.
pub fn strip_legacy_tokens(content: &str) -> String {
    strip_blocks(content, legacy_res())
}

/// Render-pipeline variant: removes the superseded header blocks but leaves
/// BIGICON blocks for token expansion.
pub(crate) fn strip_header_blocks(content: &str) -> String {
    strip_blocks(content, header_res())
}

fn strip_blocks(content: &str, patterns: &[Regex]) -> String {
    let mut out = content.to_string();
    for re in patterns {
        out = re.replace_all(&out, "").into_owned();
    }
    collapse_blank_lines(&out).trim().to_string()
}

fn collapse_blank_lines(content: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:[ \t]*\r?\n){3,}").expect("valid blank line pattern"))
        .replace_all(content, "\n\n")
        .into_owned()
}

// The regex crate has no backreferences, so each token name gets its own
// compiled pattern instead of one alternation with a matching close tag.
fn block_pattern(name: &str) -> Regex {
    Regex::new(&format!(
        r"(?s)(?:<[^/>][^>]*>[ \t]*)?\{{\{{{name}\}}\}}.*?\{{\{{/{name}\}}\}}(?:[ \t]*</[^>]+>)?"
    ))
    .expect("valid legacy token pattern")
}

fn legacy_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| LEGACY_TOKENS.iter().map(|name| block_pattern(name)).collect())
}

fn header_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| HEADER_TOKENS.iter().map(|name| block_pattern(name)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_title_block() {
        let out = strip_legacy_tokens("{{TITLE}}My Story{{/TITLE}}\n\nOnce upon a time.");
        assert_eq!(out, "Once upon a time.");
    }

    #[test]
    fn test_strip_wrapped_in_enclosing_tag() {
        let out = strip_legacy_tokens("<h1>{{TITLE}}My Story{{/TITLE}}</h1>body");
        assert_eq!(out, "body");
    }

    #[test]
    fn test_strip_all_legacy_tokens() {
        let content = "{{TITLE}}t{{/TITLE}}{{TAGLINE}}g{{/TAGLINE}}{{AUTHOR}}a{{/AUTHOR}}\
{{EXCERPT}}e{{/EXCERPT}}{{BIGICON}}b.png{{/BIGICON}}body";
        assert_eq!(strip_legacy_tokens(content), "body");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let content = "{{TITLE}}x{{/TITLE}}\n\n\n\nbody\n\n\n\nmore";
        let once = strip_legacy_tokens(content);
        let twice = strip_legacy_tokens(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strip_collapses_blank_lines() {
        let out = strip_legacy_tokens("one\n\n\n\n\ntwo");
        assert_eq!(out, "one\n\ntwo");
    }

    #[test]
    fn test_unterminated_block_left_alone() {
        let content = "{{TITLE}}never closed\n\nbody";
        assert_eq!(strip_legacy_tokens(content), content);
    }

    #[test]
    fn test_header_blocks_keep_bigicon() {
        let content = "{{TITLE}}t{{/TITLE}}{{BIGICON}}hero.png{{/BIGICON}}body";
        assert_eq!(strip_header_blocks(content), "{{BIGICON}}hero.png{{/BIGICON}}body");
    }
}
