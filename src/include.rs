use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::context::{RenderContext, StoryMeta};
use crate::error::RenderResult;
use crate::normalize;
use crate::strip;
use crate::tokens;

/// Inclusion stops recursing at this depth; deeper markers stay literal.
pub const MAX_INCLUDE_DEPTH: usize = 3;

/// Story fields returned by the caller-supplied lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncludedStory {
    pub story_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub content: String,
}

/// Side-channel lookup used by the `[STORY-CODE]` inclusion marker.
///
/// The renderer is synchronous; if the backing store is async, bridging is
/// the caller's concern. `Ok(None)` and `Err` both leave the marker literal.
pub trait StoryLookup {
    fn story_by_code(&self, code: &str) -> RenderResult<Option<IncludedStory>>;
}

fn include_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[([A-Z0-9][A-Z0-9-]{1,31})\]").expect("valid include marker pattern")
    })
}

/// Replace `[STORY-CODE]` markers with the referenced story's rendered body.
///
/// The included body runs through the same strip/expand/clean/wrap passes as
/// the outer story, with the included story's own descriptor but the outer
/// viewer's PID and clock. Sanitization is left to the single outer pass.
pub(crate) fn splice_includes(
    content: &str,
    ctx: &RenderContext,
    lookup: &dyn StoryLookup,
    depth: usize,
) -> String {
    if depth >= MAX_INCLUDE_DEPTH {
        return content.to_string();
    }

    include_marker_re()
        .replace_all(content, |caps: &regex::Captures| {
            let code = &caps[1];
            match lookup.story_by_code(code) {
                Ok(Some(story)) => render_included(&story, ctx, lookup, depth),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn render_included(
    story: &IncludedStory,
    outer: &RenderContext,
    lookup: &dyn StoryLookup,
    depth: usize,
) -> String {
    let ctx = RenderContext {
        personal_id: outer.personal_id.clone(),
        now: Some(outer.timestamp()),
        story: Some(StoryMeta {
            title: story.title.clone(),
            story_code: Some(story.story_code.clone()),
            author: story.author.clone(),
            category: story.category.clone(),
        }),
    };

    let body = strip::strip_header_blocks(&story.content);
    let body = tokens::expand_tokens(&body, &ctx);
    let body = splice_includes(&body, &ctx, lookup, depth + 1);
    let body = normalize::clean_editor_divs(&body);
    normalize::wrap_paragraphs(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use std::collections::HashMap;

    struct MapLookup {
        stories: HashMap<String, IncludedStory>,
    }

    impl MapLookup {
        fn with(stories: Vec<IncludedStory>) -> Self {
            Self {
                stories: stories
                    .into_iter()
                    .map(|s| (s.story_code.clone(), s))
                    .collect(),
            }
        }
    }

    impl StoryLookup for MapLookup {
        fn story_by_code(&self, code: &str) -> RenderResult<Option<IncludedStory>> {
            Ok(self.stories.get(code).cloned())
        }
    }

    struct FailingLookup;

    impl StoryLookup for FailingLookup {
        fn story_by_code(&self, code: &str) -> RenderResult<Option<IncludedStory>> {
            Err(RenderError::Lookup {
                code: code.to_string(),
                message: "backend unavailable".to_string(),
            })
        }
    }

    fn buddy() -> IncludedStory {
        IncludedStory {
            story_code: "BUDDY-01".to_string(),
            title: Some("Buddy".to_string()),
            content: "Buddy wagged his tail.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_splice_found_story() {
        let lookup = MapLookup::with(vec![buddy()]);
        let out = splice_includes("Before [BUDDY-01] after", &RenderContext::new(), &lookup, 0);
        assert_eq!(out, "Before <p>Buddy wagged his tail.</p> after");
    }

    #[test]
    fn test_splice_missing_story_stays_literal() {
        let lookup = MapLookup::with(vec![]);
        let out = splice_includes("See [NOPE-99].", &RenderContext::new(), &lookup, 0);
        assert_eq!(out, "See [NOPE-99].");
    }

    #[test]
    fn test_splice_lookup_error_stays_literal() {
        let out = splice_includes("See [BUDDY-01].", &RenderContext::new(), &FailingLookup, 0);
        assert_eq!(out, "See [BUDDY-01].");
    }

    #[test]
    fn test_splice_included_tokens_use_included_meta() {
        let mut story = buddy();
        story.content = "From {{STORY_CODE}}.".to_string();
        let lookup = MapLookup::with(vec![story]);
        let out = splice_includes("[BUDDY-01]", &RenderContext::new(), &lookup, 0);
        assert_eq!(out, "<p>From BUDDY-01.</p>");
    }

    #[test]
    fn test_splice_depth_capped() {
        let mut a = buddy();
        a.story_code = "LOOP-01".to_string();
        a.content = "again [LOOP-01]".to_string();
        let lookup = MapLookup::with(vec![a]);
        let out = splice_includes("[LOOP-01]", &RenderContext::new(), &lookup, 0);
        // Recursion bottoms out; the innermost marker survives literally.
        assert!(out.contains("[LOOP-01]"));
        assert!(out.matches("again").count() <= MAX_INCLUDE_DEPTH);
    }

    #[test]
    fn test_marker_pattern_ignores_lowercase() {
        let lookup = MapLookup::with(vec![buddy()]);
        let out = splice_includes("[buddy-01]", &RenderContext::new(), &lookup, 0);
        assert_eq!(out, "[buddy-01]");
    }
}
