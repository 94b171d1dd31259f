//! Centralized error types for the pagesel workspace.

use thiserror::Error;

/// Top-level error enum. Variants map to subsystems.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SelectError {
    #[error("Provider error: {0}")]
    Provider(String),

    /// The loader got a response but could not decode a page out of it.
    #[error("Malformed page: {0}")]
    MalformedPage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SelectResult<T> = Result<T, SelectError>;
