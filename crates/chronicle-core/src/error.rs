//! Domain error types.

use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationError;

/// Top-level domain error type.
///
/// Distinguishes "your input was wrong" (`Validation`, `NotFound`) from
/// "the system is unhealthy" (`Storage`).
#[derive(Debug, Error)]
pub enum DomainError {
    /// A stream, post or comment was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Command input was rejected; keyed by field.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reading or writing the event store failed.
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { stream, .. } => Self::NotFound(stream),
            other => Self::Storage(other),
        }
    }
}
