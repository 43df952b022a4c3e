//! # storytext — content token renderer
//!
//! Turns database-stored story content (legacy HTML or plain text) into
//! sanitized HTML ready for DOM insertion.
//!
//! ## Pipeline
//! - Strip superseded header-metadata blocks (`{{TITLE}}…{{/TITLE}}` and kin)
//! - Expand placeholder tokens against a [`RenderContext`]
//! - Optionally splice `[STORY-CODE]` inclusions via a caller-supplied lookup
//! - Clean editor-produced `<div>` soup and wrap loose text in paragraphs
//! - Sanitize through an allow-list, producing an opaque [`SanitizedHtml`]
//!
//! Every step is string-level and synchronous; rendering never fails — the
//! worst case is literal token text, never a panic reaching the page.
//!
//! ## Example
//! ```ignore
//! use storytext::{render, RenderContext, StoryMeta};
//!
//! let ctx = RenderContext::new()
//!     .with_personal_id("ABCDEF")
//!     .with_story(StoryMeta {
//!         title: Some("Buddy Finds a Friend".into()),
//!         ..Default::default()
//!     });
//!
//! let html = render("Hello {{PID}}!\n\nThis is {{STORY_TITLE}}.", &ctx);
//! // html.as_str() == "<p>Hello ABCD**!</p>\n<p>This is Buddy Finds a Friend.</p>"
//! ```

pub mod context;
pub mod error;
pub mod include;
pub mod normalize;
pub mod profile;
pub mod sanitize;
pub mod strip;
pub mod tokens;

// --- Core types ---
pub use context::{mask_pid, RenderContext, StoryMeta};
pub use error::{RenderError, RenderResult};
pub use include::{IncludedStory, StoryLookup, MAX_INCLUDE_DEPTH};
pub use profile::{apply_profile, StyleProfile, StyleProfiles};
pub use sanitize::{sanitize_comment, sanitize_story, SanitizedHtml};

// --- Utilities ---
pub use normalize::{strip_tags, word_count};
pub use strip::strip_legacy_tokens;
pub use tokens::{extract_bigicon, resolve_icon_path};

/// Render story or webtext content to sanitized HTML.
pub fn render(content: &str, ctx: &RenderContext) -> SanitizedHtml {
    let body = strip::strip_header_blocks(content);
    let body = tokens::expand_tokens(&body, ctx);
    finish(&body)
}

/// Render story content, splicing `[STORY-CODE]` inclusion markers through
/// the caller-supplied lookup. Markers whose lookup misses or fails stay
/// literal.
pub fn render_with_includes(
    content: &str,
    ctx: &RenderContext,
    lookup: &dyn StoryLookup,
) -> SanitizedHtml {
    let body = strip::strip_header_blocks(content);
    let body = tokens::expand_tokens(&body, ctx);
    let body = include::splice_includes(&body, ctx, lookup, 0);
    finish(&body)
}

/// Render a short user-submitted comment. Uses the strict comment profile —
/// effectively plain text with minimal inline formatting.
pub fn render_comment(text: &str) -> SanitizedHtml {
    sanitize::sanitize_comment(&normalize::wrap_paragraphs(text))
}

fn finish(body: &str) -> SanitizedHtml {
    let body = normalize::clean_editor_divs(body);
    let body = normalize::wrap_paragraphs(&body);
    sanitize::sanitize_story(&body)
}
