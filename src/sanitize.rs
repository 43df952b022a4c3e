use ammonia::Builder;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// HTML that has passed the allow-list sanitizer.
///
/// Only this module constructs the type, so the DOM-insertion boundary can
/// accept a `SanitizedHtml` and nothing else — no other code path can hand it
/// a raw string. Serializes as the one-field `{ "__html": … }` wrapper the
/// insertion boundary expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedHtml {
    #[serde(rename = "__html")]
    html: String,
}

impl SanitizedHtml {
    pub(crate) fn from_clean(html: String) -> Self {
        Self { html }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.html
    }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Tags allowed in story and webtext content
const STORY_TAGS: &[&str] = &[
    "a", "audio", "b", "blockquote", "br", "div", "em", "figcaption", "figure", "h1", "h2", "h3",
    "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "s", "source", "span", "strong", "u",
    "ul", "video",
];

/// Tags allowed in user-submitted comments — strictly narrower than the
/// story profile. Comments are community-generated and higher-risk.
const COMMENT_TAGS: &[&str] = &["b", "br", "em", "i", "p", "strong"];

/// Inline style declarations that survive sanitization. Presentational only.
const ALLOWED_STYLE_PROPS: &[&str] = &[
    "color",
    "font-size",
    "font-family",
    "text-align",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
];

fn filter_presentational_styles(style: &str) -> String {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim();
            if ALLOWED_STYLE_PROPS.contains(&prop.as_str()) && !value.is_empty() {
                Some(format!("{}: {}", prop, value))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn story_cleaner() -> &'static Builder<'static> {
    static CLEANER: OnceLock<Builder<'static>> = OnceLock::new();
    CLEANER.get_or_init(|| {
        let mut cleaner = Builder::default();
        cleaner
            .tags(STORY_TAGS.iter().copied().collect())
            .strip_comments(true)
            .add_generic_attributes(&["style", "class"])
            .add_tag_attributes("a", &["href", "title"])
            .add_tag_attributes("img", &["src", "alt", "width", "height"])
            .add_tag_attributes("audio", &["src", "controls", "preload"])
            .add_tag_attributes("video", &["src", "controls", "preload", "poster", "width", "height"])
            .add_tag_attributes("source", &["src", "type"])
            .url_schemes(["http", "https", "mailto"].into_iter().collect())
            .link_rel(Some("noopener noreferrer"))
            .attribute_filter(|_element, attribute, value| {
                if attribute == "style" {
                    let kept = filter_presentational_styles(value);
                    if kept.is_empty() {
                        None
                    } else {
                        Some(kept.into())
                    }
                } else {
                    Some(value.into())
                }
            });
        cleaner
    })
}

fn comment_cleaner() -> &'static Builder<'static> {
    static CLEANER: OnceLock<Builder<'static>> = OnceLock::new();
    CLEANER.get_or_init(|| {
        let mut cleaner = Builder::default();
        cleaner
            .tags(COMMENT_TAGS.iter().copied().collect())
            .generic_attributes(Default::default())
            .strip_comments(true)
            .url_schemes(["http", "https"].into_iter().collect());
        cleaner
    })
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Sanitize story/webtext content with the broad allow-list.
pub fn sanitize_story(html: &str) -> SanitizedHtml {
    SanitizedHtml::from_clean(story_cleaner().clean(html).to_string())
}

/// Sanitize comment text with the narrow allow-list.
pub fn sanitize_comment(html: &str) -> SanitizedHtml {
    SanitizedHtml::from_clean(comment_cleaner().clean(html).to_string())
}
