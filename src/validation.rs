//! Validation Layer
//!
//! Deterministic, side-effect-free normalization and rejection of untrusted
//! entry fields. Every value that reaches the [`EntryStore`](crate::EntryStore)
//! has passed through here first.
//!
//! # Components
//!
//! - [`Validator`]: limit-aware checks for messages, tags, categories, and
//!   whole entry payloads
//! - [`validate_text`], [`validate_id`], [`validate_timestamp`]: checks that
//!   need no configured limits
//! - [`Limits`]: policy constants injected at startup
//! - [`ValidationError`]: typed failures, classified by [`ErrorKind`](crate::ErrorKind)

mod error;
mod rules;
mod sanitize;

pub use error::ValidationError;
pub use rules::{
    DEFAULT_MAX_CATEGORY_LENGTH, DEFAULT_MAX_ENTRIES, DEFAULT_MAX_MESSAGE_LENGTH,
    DEFAULT_MAX_TAG_LENGTH, DEFAULT_MAX_TAGS_PER_ENTRY, EntryDraft, EntryPatch, Limits,
    MAX_CLOCK_SKEW_SECS, MAX_ID_LENGTH, Validator, check_timestamp, parse_datetime, validate_id,
    validate_text, validate_timestamp,
};
pub use sanitize::{escape_html, strip_dangerous, unescape_html};
