use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{RenderError, RenderResult};
use crate::sanitize::SanitizedHtml;

/// Typography applied to a block of rendered content.
///
/// One explicit profile passed as an argument replaces the old scattering of
/// per-category formatting paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleProfile {
    pub font_family: String,
    pub font_size: String,
    pub color: String,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            font_family: "Georgia, serif".to_string(),
            font_size: "1.1rem".to_string(),
            color: "#333333".to_string(),
        }
    }
}

/// Named profile presets, typically authored as a YAML document keyed by
/// story category:
///
/// ```yaml
/// animals:
///   fontFamily: "Comic Sans MS, cursive"
///   fontSize: "1.2rem"
///   color: "#2a4d2a"
/// bedtime:
///   color: "#1a1a3a"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProfiles {
    #[serde(flatten)]
    profiles: HashMap<String, StyleProfile>,
}

impl StyleProfiles {
    pub fn from_yaml(yaml: &str) -> RenderResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn get(&self, category: &str) -> Option<&StyleProfile> {
        self.profiles.get(category)
    }

    /// Resolve a category to its profile, erroring on unknown names
    pub fn resolve(&self, category: &str) -> RenderResult<&StyleProfile> {
        self.get(category).ok_or_else(|| RenderError::ProfileNotFound {
            name: category.to_string(),
        })
    }
}

/// Wrap sanitized content in a container carrying the profile's typography.
///
/// Pure function of its arguments; the wrapper is built from trusted profile
/// values, so the result stays sanitized.
pub fn apply_profile(html: &SanitizedHtml, profile: &StyleProfile) -> SanitizedHtml {
    let style = format!(
        "font-family: {}; font-size: {}; color: {}",
        attr_escape(&profile.font_family),
        attr_escape(&profile.font_size),
        attr_escape(&profile.color),
    );
    SanitizedHtml::from_clean(format!(
        r#"<div class="story-body" style="{}">{}</div>"#,
        style,
        html.as_str()
    ))
}

fn attr_escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize_story;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profiles_from_yaml() {
        let yaml = r##"
animals:
  fontFamily: "Comic Sans MS, cursive"
  fontSize: "1.2rem"
  color: "#2a4d2a"
bedtime:
  color: "#1a1a3a"
"##;
        let profiles = StyleProfiles::from_yaml(yaml).unwrap();
        let animals = profiles.get("animals").unwrap();
        assert_eq!(animals.font_family, "Comic Sans MS, cursive");
        // Unspecified fields fall back to the defaults
        let bedtime = profiles.get("bedtime").unwrap();
        assert_eq!(bedtime.color, "#1a1a3a");
        assert_eq!(bedtime.font_family, StyleProfile::default().font_family);
    }

    #[test]
    fn test_resolve_unknown_profile() {
        let profiles = StyleProfiles::default();
        assert!(matches!(
            profiles.resolve("space"),
            Err(RenderError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_from_yaml_rejects_garbage() {
        // A scalar can never deserialize into a profile mapping. Note that a
        // three-element sequence CAN — serde fills struct fields positionally —
        // so a list of strings is not actually garbage here.
        assert!(StyleProfiles::from_yaml("animals: 42").is_err());
        assert!(StyleProfiles::from_yaml("animals:\n  color: [1, 2]").is_err());
    }

    #[test]
    fn test_from_yaml_accepts_positional_sequence() {
        // Serde's positional struct-from-sequence shorthand is accepted.
        let profiles = StyleProfiles::from_yaml("animals: [a, b, c]").unwrap();
        let animals = profiles.get("animals").unwrap();
        assert_eq!(animals.font_family, "a");
        assert_eq!(animals.color, "c");
    }

    #[test]
    fn test_apply_profile_wraps_content() {
        let body = sanitize_story("<p>Once upon a time.</p>");
        let out = apply_profile(&body, &StyleProfile::default());
        assert_eq!(
            out.as_str(),
            r#"<div class="story-body" style="font-family: Georgia, serif; font-size: 1.1rem; color: #333333"><p>Once upon a time.</p></div>"#
        );
    }

    #[test]
    fn test_apply_profile_escapes_values() {
        let profile = StyleProfile {
            font_family: r#"Weird" Font"#.to_string(),
            ..Default::default()
        };
        let out = apply_profile(&sanitize_story("<p>x</p>"), &profile);
        assert!(!out.as_str().contains(r#"Weird" Font"#));
        assert!(out.as_str().contains("&quot;"));
    }
}
