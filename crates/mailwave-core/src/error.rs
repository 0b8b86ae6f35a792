//! Error types for Mailwave

use thiserror::Error;

/// Result type alias for Mailwave operations
pub type MailwaveResult<T> = Result<T, MailwaveError>;

/// Main error type for Mailwave
///
/// The first four variants classify events the resolver falls back on. They
/// are reported in logs and outcomes and never abort an interception.
#[derive(Error, Debug)]
pub enum MailwaveError {
    #[error("Unknown surface: {0}")]
    UnknownSurface(String),

    #[error("No policy for owner: {0}")]
    UnresolvedPolicy(String),

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("Reserved URL intercepted: {0}")]
    ReservedUrlIntercepted(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl MailwaveError {
    /// Create a new host error
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new malformed URL error
    pub fn malformed_url(msg: impl Into<String>) -> Self {
        Self::MalformedUrl(msg.into())
    }
}
