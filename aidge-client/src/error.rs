//! Error types for the Aidge client

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Aidge client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Transport failed without an underlying HTTP error
    #[error("Transport error: {0}")]
    Transport(String),

    /// No task id could be obtained from a submission
    #[error("Task submission failed: {0}")]
    SubmissionFailed(String),

    /// A status query could not be completed or parsed
    #[error("Status query failed: {0}")]
    QueryFailed(String),

    /// Failed to parse or encode a payload
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The concurrency limiter was closed while waiting for a permit
    #[error("Concurrency limiter closed")]
    LimiterClosed,

    /// Invalid client configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Check if this error came from a submission
    pub fn is_submission_failure(&self) -> bool {
        matches!(self, Self::SubmissionFailed(_))
    }
}
