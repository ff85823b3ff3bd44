//! Storage-specific error types.
//!
//! All storage operations return [`StorageError`] on failure. Use
//! [`StorageError::kind`] to branch on the cause.

use thiserror::Error;

use crate::ErrorKind;
use crate::validation::ValidationError;

/// Errors that can occur in the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A field or payload failed validation. Nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No entry with this id exists.
    #[error("entry not found: {id}")]
    NotFound { id: String },

    /// The store already holds the maximum number of entries.
    #[error("maximum number of entries reached ({max})")]
    CapacityExceeded { max: usize },
}

impl StorageError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(e) => e.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
        }
    }
}
