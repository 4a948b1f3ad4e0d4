//! Oracle error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for oracle calls.
pub type OracleResult<T> = Result<T, OracleError>;

/// Errors that can occur while talking to a language model.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The call did not finish within the configured timeout.
    #[error("oracle request timed out after {0:?}")]
    Timeout(Duration),

    /// No API key was configured.
    #[error("oracle API key not configured")]
    MissingApiKey,

    /// Connection or protocol failure.
    #[error("oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with an error status.
    #[error("oracle error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The endpoint answered, but not with usable content.
    #[error("invalid oracle response: {0}")]
    InvalidResponse(String),

    /// Failed to serialize the request payload.
    #[error("failed to serialize oracle payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl OracleError {
    /// Whether a later attempt could plausibly succeed.
    ///
    /// The core never retries; callers that wrap it may.
    pub fn is_retriable(&self) -> bool {
        match self {
            OracleError::Timeout(_) | OracleError::Transport(_) => true,
            OracleError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
