//! Common error types for the scene library

use crate::validation::ValidationError;
use thiserror::Error;

/// Common result type for scene library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scene draft rejected before reaching the service
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}
