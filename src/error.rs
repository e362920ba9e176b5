use thiserror::Error;

/// Unified error type for git-tag-version operations
#[derive(Error, Debug)]
pub enum TagVersionError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Version record error: {0}")]
    Record(String),

    #[error("Build backend failed: {0}")]
    Build(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in git-tag-version
pub type Result<T> = std::result::Result<T, TagVersionError>;

impl TagVersionError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        TagVersionError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        TagVersionError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        TagVersionError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        TagVersionError::Remote(msg.into())
    }

    /// Create a record error with context
    pub fn record(msg: impl Into<String>) -> Self {
        TagVersionError::Record(msg.into())
    }

    /// Create a build backend error with context
    pub fn build(msg: impl Into<String>) -> Self {
        TagVersionError::Build(msg.into())
    }
}
