use thiserror::Error;

/// Unified error type for conventional-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid version format: {0}")]
    InvalidVersionFormat(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Commit history error: {0}")]
    History(String),

    #[error("Invalid release handoff: {0}")]
    Handoff(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in conventional-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a version format error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidVersionFormat(msg.into())
    }

    /// Create a missing configuration error with context
    pub fn missing(msg: impl Into<String>) -> Self {
        ReleaseError::MissingConfiguration(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create an API error with context
    pub fn api(msg: impl Into<String>) -> Self {
        ReleaseError::Api(msg.into())
    }

    /// Create a commit history error with context
    pub fn history(msg: impl Into<String>) -> Self {
        ReleaseError::History(msg.into())
    }

    /// Create a handoff error with context
    pub fn handoff(msg: impl Into<String>) -> Self {
        ReleaseError::Handoff(msg.into())
    }

    /// Create an asset error with context
    pub fn asset(msg: impl Into<String>) -> Self {
        ReleaseError::Asset(msg.into())
    }
}
