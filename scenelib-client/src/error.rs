//! Error types for the scene library client

use scenelib_common::ValidationError;
use thiserror::Error;

/// Failures of a single request/response round trip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No response received (connect, timeout, transport)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response without a structured detail
    #[error("Server error: HTTP {0}")]
    Server(u16),

    /// 4xx response carrying the service's `detail` message
    #[error("Rejected by service: {0}")]
    Validation(String),

    /// Addressed scene does not exist; `detail` is the service's message
    #[error("Scene not found: {id}")]
    NotFound { id: i64, detail: Option<String> },

    /// 2xx response whose body does not match the contract
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Failures surfaced by the store and search controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Draft rejected locally; no request was sent
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl LibraryError {
    /// Text shown to the user
    ///
    /// The service's own detail wins; otherwise `fallback` (the operation's
    /// generic failure message) is used.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            LibraryError::Client(ClientError::Validation(detail)) => detail.clone(),
            LibraryError::Client(ClientError::NotFound {
                detail: Some(detail),
                ..
            }) => detail.clone(),
            LibraryError::Invalid(e) => e.to_string(),
            LibraryError::Client(_) => fallback.to_string(),
        }
    }
}

/// Result type for store and search operations
pub type LibraryResult<T> = Result<T, LibraryError>;
