//! Validation error types.

use thiserror::Error;

use crate::ErrorKind;

/// Errors produced when an untrusted value fails a field check.
///
/// Messages only ever echo what the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value has the wrong JSON shape or type.
    #[error("{field} must be {expected}")]
    InvalidInput {
        field: &'static str,
        expected: &'static str,
    },

    /// Required text is blank after trimming.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Trimmed text is longer than allowed.
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Sequence holds more elements than allowed.
    #[error("maximum {max} {field} allowed")]
    TooMany { field: &'static str, max: usize },

    /// Text does not match the field's character class, or cannot be parsed.
    #[error("{field} {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Timestamp lies more than the allowed clock skew in the future.
    #[error("timestamp cannot be in the future")]
    FutureTimestamp,

    /// A single tag inside a tag list failed.
    #[error("tag at index {index} is invalid: {source}")]
    Tag {
        index: usize,
        source: Box<ValidationError>,
    },

    /// A single item inside a bulk restore failed.
    #[error("entry at index {index} is invalid: {source}")]
    Item {
        index: usize,
        source: Box<ValidationError>,
    },

    /// Two items of a bulk restore share an id.
    #[error("duplicate entry id: {id}")]
    DuplicateId { id: String },
}

impl ValidationError {
    /// Classify this error.
    ///
    /// Index wrappers report the kind of the failure they wrap.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::DuplicateId { .. } => ErrorKind::InvalidInput,
            Self::Empty { .. } => ErrorKind::Empty,
            Self::TooLong { .. } => ErrorKind::TooLong,
            Self::TooMany { .. } => ErrorKind::TooMany,
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::FutureTimestamp => ErrorKind::FutureTimestamp,
            Self::Tag { source, .. } | Self::Item { source, .. } => source.kind(),
        }
    }

    pub(crate) fn at_tag(self, index: usize) -> Self {
        Self::Tag {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn at_item(self, index: usize) -> Self {
        Self::Item {
            index,
            source: Box::new(self),
        }
    }
}
