//! Query layer errors

use thiserror::Error;

/// Failure retrieving or decoding one endpoint
///
/// Never retried automatically; callers must show a failure state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("HTTP error {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Transport error for {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Decode error for {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl RetrievalError {
    pub fn endpoint(&self) -> &str {
        match self {
            RetrievalError::Status { endpoint, .. }
            | RetrievalError::Transport { endpoint, .. }
            | RetrievalError::Decode { endpoint, .. } => endpoint,
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RetrievalError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
