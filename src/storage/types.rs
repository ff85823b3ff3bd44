//! Core data types for the storage layer.
//!
//! - [`Entry`]: One journal record
//! - [`Statistics`]: Aggregate counts derived on demand
//! - [`EntryQuery`] / [`SortOrder`]: Search filters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::validation::{EntryDraft, EntryPatch};

/// Number of entries kept in each "most used" ranking.
pub const TOP_N: usize = 10;

/// A journal entry.
///
/// `id` and `timestamp` are assigned by the store and never change.
///
/// # Example
///
/// ```
/// use devlog::Entry;
/// use chrono::Utc;
///
/// let entry = Entry {
///     id: "0b7e7c1e-5d1f-4f3c-9d7e-2a3c4b5d6e7f".to_string(),
///     message: "Fixed bug #42".to_string(),
///     tags: vec!["backend".to_string()],
///     category: None,
///     timestamp: Utc::now(),
/// };
/// let json = serde_json::to_value(&entry).unwrap();
/// assert!(json.get("category").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Server-generated identifier.
    pub id: String,
    /// Sanitized, HTML-escaped message.
    pub message: String,
    /// Lower-cased tags, in submission order.
    pub tags: Vec<String>,
    /// Optional category; omitted from JSON when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Creation time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub(crate) fn from_draft(id: String, draft: EntryDraft, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            message: draft.message,
            tags: draft.tags,
            category: draft.category,
            timestamp,
        }
    }

    /// Replace the fields present in `patch`.
    pub(crate) fn apply(&mut self, patch: EntryPatch) {
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}

/// Aggregate statistics over all stored entries.
///
/// Rankings hold at most [`TOP_N`] `(name, count)` pairs, sorted by count
/// descending and then by name ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_entries: usize,
    /// Distinct tags in use.
    pub total_tags: usize,
    /// Distinct categories in use.
    pub total_categories: usize,
    pub most_used_tags: Vec<(String, usize)>,
    pub most_used_categories: Vec<(String, usize)>,
}

/// Sort order for search results, by timestamp.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

/// Search filters. Every present filter must match.
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    /// Whitespace-separated tokens; each must occur in the message, the
    /// category, or a tag (case-insensitive substring).
    pub text: Option<String>,
    /// Exact tag, case-insensitive.
    pub tag: Option<String>,
    /// Exact category, case-insensitive.
    pub category: Option<String>,
    /// Inclusive lower time bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper time bound.
    pub end: Option<DateTime<Utc>>,
    pub order: Option<SortOrder>,
}

impl EntryQuery {
    /// True when no filter is set.
    pub fn is_unfiltered(&self) -> bool {
        self.text.is_none()
            && self.tag.is_none()
            && self.category.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }
}
