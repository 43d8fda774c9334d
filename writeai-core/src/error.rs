//! Error types for writeai-core

use thiserror::Error;

/// Main error type for the writeai-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Normalized generation-provider failure (text or voice vendor)
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    /// Monthly word quota exhausted for a free-plan profile
    #[error("monthly usage limit reached ({used}/{limit} words) - upgrade to continue")]
    QuotaExceeded { used: i64, limit: i64 },

    /// Project not found
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// Profile not found
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// Template not found
    #[error("template not found: {0}")]
    TemplateNotFound(String),
}

impl Error {
    /// Wrap a vendor-specific failure into the uniform provider shape.
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for writeai-core
pub type Result<T> = std::result::Result<T, Error>;
