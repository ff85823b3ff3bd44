//! Field rules and payload validation.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ValidationError;
use super::sanitize::{escape_html, strip_dangerous};

// =============================================================================
// Constants
// =============================================================================

/// Default maximum number of stored entries.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default maximum message length (characters, after trimming).
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 10_000;

/// Default maximum tag length.
pub const DEFAULT_MAX_TAG_LENGTH: usize = 50;

/// Default maximum category length.
pub const DEFAULT_MAX_CATEGORY_LENGTH: usize = 100;

/// Default maximum number of tags per entry.
pub const DEFAULT_MAX_TAGS_PER_ENTRY: usize = 20;

/// Maximum entry id length.
pub const MAX_ID_LENGTH: usize = 100;

/// Tolerated clock skew for timestamps, in seconds.
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

const TAG_CHARSET: &str =
    "contains invalid characters; only letters, numbers, hyphens, and underscores are allowed";
const CATEGORY_CHARSET: &str = "contains invalid characters; only letters, numbers, spaces, hyphens, and underscores are allowed";

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("failed to compile tag regex"))
}

fn category_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9\s_-]+$").expect("failed to compile category regex")
    })
}

// =============================================================================
// Limits
// =============================================================================

/// Policy limits injected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of stored entries (default: 10000).
    pub max_entries: usize,

    /// Maximum message length (default: 10000).
    pub max_message_length: usize,

    /// Maximum tag length (default: 50).
    pub max_tag_length: usize,

    /// Maximum category length (default: 100).
    pub max_category_length: usize,

    /// Maximum tags per entry (default: 20).
    pub max_tags_per_entry: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            max_tag_length: DEFAULT_MAX_TAG_LENGTH,
            max_category_length: DEFAULT_MAX_CATEGORY_LENGTH,
            max_tags_per_entry: DEFAULT_MAX_TAGS_PER_ENTRY,
        }
    }
}

// =============================================================================
// Validated payloads
// =============================================================================

/// Fields of a new entry after validation. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub message: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

/// Validated partial update. `None` leaves a field untouched.
///
/// `category: Some(None)` clears the category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub message: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Option<String>>,
}

impl EntryPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.tags.is_none() && self.category.is_none()
    }
}

// =============================================================================
// Free-standing checks
// =============================================================================

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn expect_str<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or(ValidationError::InvalidInput {
        field,
        expected: "a string",
    })
}

fn expect_object<'a>(
    value: &'a Value,
    field: &'static str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or(ValidationError::InvalidInput {
        field,
        expected: "an object",
    })
}

fn sanitize_text(
    field: &'static str,
    input: &str,
    max_length: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let len = char_len(trimmed);

    if len > max_length {
        return Err(ValidationError::TooLong {
            field,
            max: max_length,
        });
    }
    if len == 0 {
        return Err(ValidationError::Empty { field });
    }

    Ok(escape_html(&strip_dangerous(trimmed)))
}

/// Trim, length-check, strip dangerous markup, and HTML-escape free text.
///
/// Length limits apply to the trimmed raw input, not the escaped output.
pub fn validate_text(input: &str, max_length: usize) -> Result<String, ValidationError> {
    sanitize_text("input", input, max_length)
}

/// Check an entry id's format. Does not check existence.
pub fn validate_id(input: &str) -> Result<&str, ValidationError> {
    if !tag_pattern().is_match(input) {
        return Err(ValidationError::InvalidFormat {
            field: "entry id",
            reason: TAG_CHARSET,
        });
    }
    if input.len() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "entry id",
            max: MAX_ID_LENGTH,
        });
    }
    Ok(input)
}

/// Parse an RFC 3339 timestamp, a `YYYY-MM-DDTHH:MM:SS[.fff]` local-less
/// timestamp, or a bare `YYYY-MM-DD` date. The last two are read as UTC.
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reject times more than [`MAX_CLOCK_SKEW_SECS`] ahead of now.
pub fn check_timestamp(ts: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    if ts > Utc::now() + Duration::seconds(MAX_CLOCK_SKEW_SECS) {
        return Err(ValidationError::FutureTimestamp);
    }
    Ok(ts)
}

/// Validate a timestamp given as a date string or epoch milliseconds.
pub fn validate_timestamp(input: &Value) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = ValidationError::InvalidFormat {
        field: "timestamp",
        reason: "is not a valid date",
    };

    let ts = match input {
        Value::String(s) => parse_datetime(s).ok_or(invalid)?,
        Value::Number(n) => n
            .as_f64()
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
            .ok_or(invalid)?,
        _ => {
            return Err(ValidationError::InvalidInput {
                field: "timestamp",
                expected: "a date string or epoch milliseconds",
            });
        }
    };

    check_timestamp(ts)
}

// =============================================================================
// Validator
// =============================================================================

/// Limit-aware field validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    limits: Limits,
}

impl Validator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Validate and sanitize an entry message.
    pub fn validate_message(&self, input: &str) -> Result<String, ValidationError> {
        sanitize_text("message", input, self.limits.max_message_length)
    }

    /// Validate a single tag. Returns it trimmed and lower-cased.
    pub fn validate_tag(&self, input: &str) -> Result<String, ValidationError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "tag" });
        }
        if char_len(trimmed) > self.limits.max_tag_length {
            return Err(ValidationError::TooLong {
                field: "tag",
                max: self.limits.max_tag_length,
            });
        }
        if !tag_pattern().is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "tag",
                reason: TAG_CHARSET,
            });
        }

        Ok(trimmed.to_lowercase())
    }

    fn check_tag_count(&self, count: usize) -> Result<(), ValidationError> {
        if count > self.limits.max_tags_per_entry {
            return Err(ValidationError::TooMany {
                field: "tags",
                max: self.limits.max_tags_per_entry,
            });
        }
        Ok(())
    }

    /// Validate a tag list. Per-tag failures name the offending index.
    pub fn validate_tags<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<String>, ValidationError> {
        self.check_tag_count(tags.len())?;

        tags.iter()
            .enumerate()
            .map(|(index, tag)| {
                self.validate_tag(tag.as_ref())
                    .map_err(|e| e.at_tag(index))
            })
            .collect()
    }

    /// Validate a JSON tag list: must be an array of strings.
    pub fn validate_tags_value(&self, value: &Value) -> Result<Vec<String>, ValidationError> {
        let items = value.as_array().ok_or(ValidationError::InvalidInput {
            field: "tags",
            expected: "an array",
        })?;
        self.check_tag_count(items.len())?;

        let tags = items
            .iter()
            .enumerate()
            .map(|(index, item)| expect_str(item, "tag").map_err(|e| e.at_tag(index)))
            .collect::<Result<Vec<_>, _>>()?;

        self.validate_tags(&tags)
    }

    /// Validate a category. Returns it trimmed; case is preserved.
    pub fn validate_category(&self, input: &str) -> Result<String, ValidationError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "category" });
        }
        if char_len(trimmed) > self.limits.max_category_length {
            return Err(ValidationError::TooLong {
                field: "category",
                max: self.limits.max_category_length,
            });
        }
        if !category_pattern().is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "category",
                reason: CATEGORY_CHARSET,
            });
        }

        Ok(trimmed.to_string())
    }

    /// Validate a new-entry payload.
    ///
    /// `message` is required. Missing or null `tags` become an empty list;
    /// missing, null, or empty `category` becomes absent.
    pub fn validate_entry(&self, payload: &Value) -> Result<EntryDraft, ValidationError> {
        let object = expect_object(payload, "entry")?;

        let message = object.get("message").unwrap_or(&Value::Null);
        let message = self.validate_message(expect_str(message, "message")?)?;

        let tags = match object.get("tags") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => self.validate_tags_value(value)?,
        };

        let category = match object.get("category") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(self.validate_category(expect_str(value, "category")?)?),
        };

        Ok(EntryDraft {
            message,
            tags,
            category,
        })
    }

    /// Validate a partial update payload. Only present fields are checked.
    pub fn validate_update(&self, payload: &Value) -> Result<EntryPatch, ValidationError> {
        let object = expect_object(payload, "update")?;
        let mut patch = EntryPatch::default();

        if let Some(message) = object.get("message") {
            patch.message = Some(self.validate_message(expect_str(message, "message")?)?);
        }

        if let Some(tags) = object.get("tags") {
            patch.tags = Some(self.validate_tags_value(tags)?);
        }

        if let Some(category) = object.get("category") {
            patch.category = Some(match category {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                other => Some(self.validate_category(expect_str(other, "category")?)?),
            });
        }

        Ok(patch)
    }
}
