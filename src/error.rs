use thiserror::Error;

/// Errors produced while building or applying a transform
#[derive(Debug, Error)]
pub enum CaptionError {
    /// A node obtained from the tree moments earlier could not be located again.
    /// The tree was corrupted between matching and mutation, so the pass is aborted.
    #[error("Could not find parent of <{tag_name}>")]
    ParentNotFound { tag_name: String },

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for caption operations
pub type Result<T> = std::result::Result<T, CaptionError>;

impl CaptionError {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        CaptionError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}
