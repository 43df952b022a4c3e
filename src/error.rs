use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("Story lookup failed for code '{code}': {message}")]
    Lookup { code: String, message: String },

    /// Reserved for [`StoryLookup`](crate::include::StoryLookup) implementors
    /// that distinguish a missing story from a backend failure. The renderer
    /// treats it like any other lookup error: the marker stays literal.
    #[error("No story found for code '{code}'")]
    StoryNotFound { code: String },

    #[error("Invalid style profile document: {0}")]
    InvalidProfile(String),

    #[error("Unknown style profile '{name}'")]
    ProfileNotFound { name: String },
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::InvalidProfile(err.to_string())
    }
}
