//! Error classification shared by the validation and storage layers.

use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Failure category carried by every [`ValidationError`](crate::ValidationError)
/// and [`StorageError`](crate::StorageError).
///
/// Callers branch on the kind rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Value has the wrong shape or type.
    InvalidInput,
    /// Text exceeds its length limit.
    TooLong,
    /// Sequence exceeds its element limit.
    TooMany,
    /// Required text is blank.
    Empty,
    /// Text does not match its character class.
    InvalidFormat,
    /// Identifier lookup missed.
    NotFound,
    /// Store is full.
    CapacityExceeded,
    /// Timestamp lies beyond the allowed clock skew.
    FutureTimestamp,
}

impl ErrorKind {
    /// Whether this kind originates from input validation.
    pub fn is_validation(self) -> bool {
        !matches!(self, Self::NotFound | Self::CapacityExceeded)
    }
}
