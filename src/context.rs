use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// How many leading characters of a personal identifier stay visible.
const PID_VISIBLE_CHARS: usize = 4;

/// Story descriptor fields available for token resolution.
///
/// Every field is optional: tokens referencing an absent field resolve to
/// an empty string rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Per-render replacement context.
///
/// Lives only for the duration of one render call. The clock is read once
/// per render; tests pin it with [`RenderContext::at`].
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub personal_id: Option<String>,
    pub now: Option<DateTime<Local>>,
    pub story: Option<StoryMeta>,
}

impl RenderContext {
    /// Create an empty context (no viewer, no story, live clock)
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the viewer's personal identifier (masked before display)
    pub fn with_personal_id(mut self, pid: impl Into<String>) -> Self {
        self.personal_id = Some(pid.into());
        self
    }

    /// Attach the story descriptor
    pub fn with_story(mut self, story: StoryMeta) -> Self {
        self.story = Some(story);
        self
    }

    /// Pin the render clock to a fixed instant
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = Some(now);
        self
    }

    /// The instant this render sees as "now" — pinned if set, else read once here
    pub(crate) fn timestamp(&self) -> DateTime<Local> {
        self.now.unwrap_or_else(Local::now)
    }

    /// The viewer's personal identifier, masked. Empty string when absent.
    pub fn masked_pid(&self) -> String {
        self.personal_id.as_deref().map(mask_pid).unwrap_or_default()
    }
}

/// Mask a personal identifier: keep the first 4 characters, star the rest.
///
/// `"ABCDEF"` becomes `"ABCD**"`. Identifiers of 4 characters or fewer are
/// returned unchanged.
pub fn mask_pid(pid: &str) -> String {
    pid.chars()
        .enumerate()
        .map(|(i, c)| if i < PID_VISIBLE_CHARS { c } else { '*' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_pid_standard() {
        assert_eq!(mask_pid("ABCDEF"), "ABCD**");
        assert_eq!(mask_pid("ABCDEFGH"), "ABCD****");
    }

    #[test]
    fn test_mask_pid_short() {
        assert_eq!(mask_pid("ABC"), "ABC");
        assert_eq!(mask_pid("ABCD"), "ABCD");
        assert_eq!(mask_pid(""), "");
    }

    #[test]
    fn test_masked_pid_absent() {
        let ctx = RenderContext::new();
        assert_eq!(ctx.masked_pid(), "");
    }

    #[test]
    fn test_masked_pid_present() {
        let ctx = RenderContext::new().with_personal_id("WXYZ99");
        assert_eq!(ctx.masked_pid(), "WXYZ**");
    }
}
