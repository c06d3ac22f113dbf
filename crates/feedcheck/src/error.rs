//! Error types for the validator.

use feedcheck_core::{ErrorKind, ValidationError};
use thiserror::Error;

/// Errors that can occur during validator operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The input was rejected.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The verification backend failed to initialize or to run a call.
    #[error("backend error: {0}")]
    Backend(String),
}

impl Error {
    /// The validation failure kind, if this is a validation failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Validation(e) => Some(e.kind()),
            Error::Backend(_) => None,
        }
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            Error::Backend(_) => None,
        }
    }
}

/// Result type for validator operations.
pub type Result<T> = std::result::Result<T, Error>;
