//! Entry store: the single authority over the entry collection.
//!
//! Every mutation validates its input before touching the collection, so an
//! entry is either fully valid and stored or rejected in full.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::storage::StorageError;
use crate::storage::types::{Entry, EntryQuery, SortOrder, Statistics, TOP_N};
use crate::validation::{
    Limits, ValidationError, Validator, unescape_html, validate_id, validate_timestamp,
};

/// Collection state guarded by the store lock.
#[derive(Default)]
struct Entries {
    by_id: HashMap<String, Entry>,
    /// Ids in insertion order.
    order: Vec<String>,
}

impl Entries {
    fn len(&self) -> usize {
        self.order.len()
    }

    fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    fn insert(&mut self, entry: Entry) {
        self.order.push(entry.id.clone());
        self.by_id.insert(entry.id.clone(), entry);
    }

    fn remove(&mut self, id: &str) -> Option<Entry> {
        let entry = self.by_id.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(entry)
    }

    /// Draw random ids until one is not in use.
    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }
}

/// In-memory entry store.
///
/// Cheap to clone; clones share the same collection.
#[derive(Clone)]
pub struct EntryStore {
    entries: Arc<RwLock<Entries>>,
    validator: Validator,
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("limits", self.validator.limits())
            .finish_non_exhaustive()
    }
}

impl EntryStore {
    /// Create an empty store enforcing `limits`.
    pub fn new(limits: Limits) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            validator: Validator::new(limits),
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn limits(&self) -> &Limits {
        self.validator.limits()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of all entries in insertion order.
    pub async fn list(&self) -> Vec<Entry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Fetch one entry by id.
    pub async fn get_by_id(&self, id: &str) -> Result<Entry, StorageError> {
        let id = validate_id(id)?;
        self.entries
            .read()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })
    }

    /// Validate `payload` and store it as a new entry.
    ///
    /// The store assigns a random id and the current time.
    pub async fn add(&self, payload: &Value) -> Result<Entry, StorageError> {
        let draft = self.validator.validate_entry(payload)?;

        let mut entries = self.entries.write().await;
        let max = self.limits().max_entries;
        if entries.len() >= max {
            tracing::warn!(max, "Entry store is full, rejecting add");
            return Err(StorageError::CapacityExceeded { max });
        }

        let entry = Entry::from_draft(entries.fresh_id(), draft, Utc::now());
        entries.insert(entry.clone());

        tracing::debug!(id = %entry.id, tags = entry.tags.len(), "Entry added");
        Ok(entry)
    }

    /// Replace the fields present in `payload`; absent fields are untouched.
    pub async fn update(&self, id: &str, payload: &Value) -> Result<Entry, StorageError> {
        let id = validate_id(id)?;

        let mut entries = self.entries.write().await;
        let entry = entries
            .by_id
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;

        let patch = self.validator.validate_update(payload)?;
        entry.apply(patch);

        tracing::debug!(id = %entry.id, "Entry updated");
        Ok(entry.clone())
    }

    /// Remove an entry.
    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let id = validate_id(id)?;

        self.entries
            .write()
            .await
            .remove(id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;

        tracing::debug!(id, "Entry deleted");
        Ok(())
    }

    /// Compute tag and category statistics from the current collection.
    pub async fn statistics(&self) -> Statistics {
        let entries = self.entries.read().await;

        let mut tag_counts: HashMap<&str, usize> = HashMap::new();
        let mut category_counts: HashMap<&str, usize> = HashMap::new();

        for entry in entries.by_id.values() {
            for tag in &entry.tags {
                *tag_counts.entry(tag.as_str()).or_default() += 1;
            }
            if let Some(category) = &entry.category {
                *category_counts.entry(category.as_str()).or_default() += 1;
            }
        }

        Statistics {
            total_entries: entries.len(),
            total_tags: tag_counts.len(),
            total_categories: category_counts.len(),
            most_used_tags: top_counts(tag_counts),
            most_used_categories: top_counts(category_counts),
        }
    }

    /// Filter entries and sort them by timestamp (newest first by default).
    pub async fn search(&self, query: &EntryQuery) -> Result<Vec<Entry>, StorageError> {
        let tokens = match &query.text {
            Some(text) => self.search_tokens(text)?,
            None => Vec::new(),
        };
        let tag = query.tag.as_deref().map(str::to_lowercase);
        let category = query.category.as_deref().map(str::to_lowercase);

        let mut matches: Vec<Entry> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|entry| query.start.is_none_or(|start| entry.timestamp >= start))
            .filter(|entry| query.end.is_none_or(|end| entry.timestamp <= end))
            .filter(|entry| tokens.iter().all(|token| contains_token(entry, token)))
            .filter(|entry| {
                tag.as_deref()
                    .is_none_or(|tag| entry.tags.iter().any(|t| t.to_lowercase() == tag))
            })
            .filter(|entry| {
                category.as_deref().is_none_or(|category| {
                    entry
                        .category
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase() == category)
                })
            })
            .cloned()
            .collect();

        match query.order.unwrap_or_default() {
            SortOrder::Asc => matches.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            SortOrder::Desc => matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        }

        Ok(matches)
    }

    /// Lower-cased search tokens.
    fn search_tokens(&self, text: &str) -> Result<Vec<String>, StorageError> {
        let max = self.limits().max_message_length;
        if text.trim().chars().count() > max {
            return Err(ValidationError::TooLong { field: "query", max }.into());
        }

        Ok(text.split_whitespace().map(str::to_lowercase).collect())
    }

    /// Distinct tags in use, sorted.
    pub async fn tags(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let tags: BTreeSet<&str> = entries
            .iter()
            .flat_map(|entry| entry.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }

    /// Distinct categories in use, sorted.
    pub async fn categories(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let categories: BTreeSet<&str> = entries
            .iter()
            .filter_map(|entry| entry.category.as_deref())
            .collect();
        categories.into_iter().map(str::to_string).collect()
    }

    /// Replace the whole collection with previously exported entries.
    ///
    /// Each item must carry a valid `id` and `timestamp` besides the regular
    /// entry fields. Nothing changes unless every item passes.
    pub async fn replace_all(&self, items: &[Value]) -> Result<usize, StorageError> {
        let max = self.limits().max_entries;
        if items.len() > max {
            return Err(StorageError::CapacityExceeded { max });
        }

        let mut restored = Entries::default();
        for (index, item) in items.iter().enumerate() {
            let entry = self.restore_entry(item).map_err(|e| e.at_item(index))?;
            if restored.by_id.contains_key(&entry.id) {
                return Err(ValidationError::DuplicateId { id: entry.id }
                    .at_item(index)
                    .into());
            }
            restored.insert(entry);
        }

        let count = restored.len();
        *self.entries.write().await = restored;

        tracing::info!(count, "Entry store restored");
        Ok(count)
    }

    fn restore_entry(&self, item: &Value) -> Result<Entry, ValidationError> {
        let draft = self.validator.validate_entry(item)?;

        let id = item
            .get("id")
            .and_then(Value::as_str)
            .ok_or(ValidationError::InvalidInput {
                field: "entry id",
                expected: "a string",
            })?;
        let id = validate_id(id)?.to_string();
        let timestamp = validate_timestamp(item.get("timestamp").unwrap_or(&Value::Null))?;

        Ok(Entry::from_draft(id, draft, timestamp))
    }

    /// Drop every entry. Returns how many were removed.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        *entries = Entries::default();
        count
    }
}

/// Case-insensitive substring match against the unescaped message, the
/// category, and tags. `token` must already be lower-cased.
fn contains_token(entry: &Entry, token: &str) -> bool {
    unescape_html(&entry.message).to_lowercase().contains(token)
        || entry
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(token))
        || entry.tags.iter().any(|t| t.to_lowercase().contains(token))
}

/// Highest counts first, ties by name, capped at [`TOP_N`].
fn top_counts(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(TOP_N);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use chrono::{DateTime, Duration};
    use serde_json::json;

    fn store() -> EntryStore {
        EntryStore::new(Limits::default())
    }

    fn small_store(max_entries: usize) -> EntryStore {
        EntryStore::new(Limits {
            max_entries,
            ..Limits::default()
        })
    }

    // =========================================================================
    // add / get
    // =========================================================================

    #[tokio::test]
    async fn test_add_assigns_id_and_timestamp() {
        let store = store();
        let before = Utc::now();

        let entry = store
            .add(&json!({
                "message": "Fixed bug #42",
                "tags": ["backend", "urgent"],
                "category": "work"
            }))
            .await
            .unwrap();

        assert_eq!(entry.id.len(), 36);
        assert!(validate_id(&entry.id).is_ok());
        assert_eq!(entry.message, "Fixed bug #42");
        assert_eq!(entry.tags, vec!["backend", "urgent"]);
        assert_eq!(entry.category.as_deref(), Some("work"));
        assert!(entry.timestamp >= before && entry.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_add_then_get_roundtrip() {
        let store = store();
        let added = store
            .add(&json!({"message": "  <b>bold</b> ", "tags": ["Rust"]}))
            .await
            .unwrap();

        let fetched = store.get_by_id(&added.id).await.unwrap();
        assert_eq!(fetched, added);
        assert_eq!(fetched.message, "&lt;b&gt;bold&lt;&#x2F;b&gt;");
        assert_eq!(fetched.tags, vec!["rust"]);
        assert_eq!(fetched.category, None);
    }

    #[tokio::test]
    async fn test_add_generates_unique_ids() {
        let store = store();
        let a = store.add(&json!({"message": "one"})).await.unwrap();
        let b = store.add(&json!({"message": "two"})).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_add_invalid_payload_stores_nothing() {
        let store = store();

        let err = store.add(&json!({"tags": ["a"]})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = store
            .add(&json!({"message": "ok", "tags": ["fine", "not fine"]}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_at_capacity() {
        let store = small_store(2);
        store.add(&json!({"message": "one"})).await.unwrap();
        store.add(&json!({"message": "two"})).await.unwrap();

        let err = store.add(&json!({"message": "three"})).await.unwrap_err();
        assert_eq!(err, StorageError::CapacityExceeded { max: 2 });
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_by_id_errors() {
        let store = store();
        let err = store.get_by_id("missing-id").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = store.get_by_id("bad id!").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = store();
        for message in ["first", "second", "third"] {
            store.add(&json!({ "message": message })).await.unwrap();
        }

        let messages: Vec<String> = store.list().await.into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    // =========================================================================
    // update / delete
    // =========================================================================

    #[tokio::test]
    async fn test_update_replaces_only_present_fields() {
        let store = store();
        let added = store
            .add(&json!({"message": "draft", "tags": ["a"], "category": "work"}))
            .await
            .unwrap();

        let updated = store
            .update(&added.id, &json!({"message": "final"}))
            .await
            .unwrap();

        assert_eq!(updated.id, added.id);
        assert_eq!(updated.timestamp, added.timestamp);
        assert_eq!(updated.message, "final");
        assert_eq!(updated.tags, vec!["a"]);
        assert_eq!(updated.category.as_deref(), Some("work"));
        assert_eq!(store.get_by_id(&added.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_clears_category() {
        let store = store();
        let added = store
            .add(&json!({"message": "m", "category": "work"}))
            .await
            .unwrap();

        let updated = store
            .update(&added.id, &json!({"category": null}))
            .await
            .unwrap();
        assert_eq!(updated.category, None);
    }

    #[tokio::test]
    async fn test_update_invalid_leaves_entry_untouched() {
        let store = store();
        let added = store
            .add(&json!({"message": "keep", "tags": ["a"]}))
            .await
            .unwrap();

        let err = store
            .update(&added.id, &json!({"message": "changed", "tags": ["bad tag"]}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(store.get_by_id(&added.id).await.unwrap(), added);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let err = store()
            .update("nope", &json!({"message": "x"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        let a = store.add(&json!({"message": "a"})).await.unwrap();
        let b = store.add(&json!({"message": "b"})).await.unwrap();

        store.delete(&a.id).await.unwrap();

        assert_eq!(store.list().await, vec![b]);
        assert_eq!(
            store.get_by_id(&a.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_store_unchanged() {
        let store = store();
        store.add(&json!({"message": "a"})).await.unwrap();

        let err = store.delete("does-not-exist").await.unwrap_err();
        assert_eq!(
            err,
            StorageError::NotFound {
                id: "does-not-exist".to_string()
            }
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_frees_capacity() {
        let store = small_store(1);
        let a = store.add(&json!({"message": "a"})).await.unwrap();
        store.delete(&a.id).await.unwrap();
        assert!(store.add(&json!({"message": "b"})).await.is_ok());
    }

    // =========================================================================
    // statistics
    // =========================================================================

    #[tokio::test]
    async fn test_statistics_counts() {
        let store = store();
        store
            .add(&json!({"message": "1", "tags": ["a", "a", "b"], "category": "work"}))
            .await
            .unwrap();
        store
            .add(&json!({"message": "2", "tags": ["a"]}))
            .await
            .unwrap();

        let stats = store.statistics().await;
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_tags, 2);
        assert_eq!(stats.total_categories, 1);
        assert_eq!(
            stats.most_used_tags,
            vec![("a".to_string(), 3), ("b".to_string(), 1)]
        );
        assert_eq!(stats.most_used_categories, vec![("work".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_statistics_empty() {
        assert_eq!(store().statistics().await, Statistics::default());
    }

    #[tokio::test]
    async fn test_statistics_tie_break_and_cap() {
        let store = store();
        let tags: Vec<String> = (0..12).rev().map(|i| format!("t{i:02}")).collect();
        store
            .add(&json!({"message": "m", "tags": tags}))
            .await
            .unwrap();
        store
            .add(&json!({"message": "m", "tags": ["t11"]}))
            .await
            .unwrap();

        let ranked = store.statistics().await.most_used_tags;
        assert_eq!(ranked.len(), TOP_N);
        assert_eq!(ranked[0], ("t11".to_string(), 2));
        assert_eq!(ranked[1], ("t00".to_string(), 1));
        assert_eq!(ranked[9], ("t08".to_string(), 1));
    }

    // =========================================================================
    // search / listings
    // =========================================================================

    async fn seeded_store() -> (EntryStore, Vec<Entry>) {
        let items = vec![
            json!({"id": "e1", "message": "Fixed parser bug", "tags": ["rust", "bug"], "category": "Work", "timestamp": "2024-01-01T10:00:00Z"}),
            json!({"id": "e2", "message": "Read about async", "tags": ["rust"], "timestamp": "2024-01-02T10:00:00Z"}),
            json!({"id": "e3", "message": "Garden & <tools>", "tags": ["home"], "category": "Side Project", "timestamp": "2024-01-03T10:00:00Z"}),
        ];
        let store = store();
        store.replace_all(&items).await.unwrap();
        let entries = store.list().await;
        (store, entries)
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_search_unfiltered_newest_first() {
        let (store, _) = seeded_store().await;
        let found = store.search(&EntryQuery::default()).await.unwrap();
        assert_eq!(ids(&found), vec!["e3", "e2", "e1"]);

        let found = store
            .search(&EntryQuery {
                order: Some(SortOrder::Asc),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["e1", "e2", "e3"]);
    }

    #[tokio::test]
    async fn test_search_text_tokens_all_match() {
        let (store, _) = seeded_store().await;

        let found = store
            .search(&EntryQuery {
                text: Some("RUST bug".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["e1"]);

        let found = store
            .search(&EntryQuery {
                text: Some("side".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["e3"]);
    }

    #[tokio::test]
    async fn test_search_text_matches_markup_characters() {
        let (store, _) = seeded_store().await;
        let found = store
            .search(&EntryQuery {
                text: Some("& <tools>".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["e3"]);
    }

    #[tokio::test]
    async fn test_search_text_ignores_entity_names() {
        let (store, _) = seeded_store().await;

        for text in ["amp", "lt", "x2F", "&amp;"] {
            let found = store
                .search(&EntryQuery {
                    text: Some(text.to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert!(found.is_empty(), "{text} matched {:?}", ids(&found));
        }
    }

    #[tokio::test]
    async fn test_search_tag_and_category_exact() {
        let (store, _) = seeded_store().await;

        let found = store
            .search(&EntryQuery {
                tag: Some("Rust".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["e2", "e1"]);

        let found = store
            .search(&EntryQuery {
                category: Some("work".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["e1"]);

        let found = store
            .search(&EntryQuery {
                tag: Some("rus".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_time_range_inclusive() {
        let (store, _) = seeded_store().await;
        let start: DateTime<Utc> = "2024-01-02T10:00:00Z".parse().unwrap();

        let found = store
            .search(&EntryQuery {
                start: Some(start),
                end: Some(start + Duration::days(1)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&found), vec!["e3", "e2"]);
    }

    #[tokio::test]
    async fn test_search_text_too_long() {
        let store = EntryStore::new(Limits {
            max_message_length: 3,
            ..Limits::default()
        });
        let err = store
            .search(&EntryQuery {
                text: Some("abcd".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooLong);
    }

    #[tokio::test]
    async fn test_tags_and_categories_sorted_distinct() {
        let (store, _) = seeded_store().await;
        assert_eq!(store.tags().await, vec!["bug", "home", "rust"]);
        assert_eq!(store.categories().await, vec!["Side Project", "Work"]);
    }

    // =========================================================================
    // replace_all / clear
    // =========================================================================

    #[tokio::test]
    async fn test_replace_all_restores_ids_and_timestamps() {
        let (store, entries) = seeded_store().await;
        assert_eq!(ids(&entries), vec!["e1", "e2", "e3"]);
        assert_eq!(
            entries[0].timestamp,
            "2024-01-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(entries[2].message, "Garden &amp; &lt;tools&gt;");
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_replace_all_is_all_or_nothing() {
        let (store, before) = seeded_store().await;

        let err = store
            .replace_all(&[
                json!({"id": "ok", "message": "fine", "timestamp": "2024-01-01T00:00:00Z"}),
                json!({"id": "bad id", "message": "fine", "timestamp": "2024-01-01T00:00:00Z"}),
            ])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert!(err.to_string().starts_with("entry at index 1 is invalid"));
        assert_eq!(store.list().await, before);
    }

    #[tokio::test]
    async fn test_replace_all_rejects_duplicates_and_future() {
        let store = store();
        let err = store
            .replace_all(&[
                json!({"id": "same", "message": "a", "timestamp": 0}),
                json!({"id": "same", "message": "b", "timestamp": 0}),
            ])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let future = (Utc::now() + Duration::hours(1)).to_rfc3339();
        let err = store
            .replace_all(&[json!({"id": "x", "message": "a", "timestamp": future})])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FutureTimestamp);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_replace_all_over_capacity() {
        let store = small_store(1);
        let err = store
            .replace_all(&[
                json!({"id": "a", "message": "a", "timestamp": 0}),
                json!({"id": "b", "message": "b", "timestamp": 0}),
            ])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    }

    #[tokio::test]
    async fn test_clear() {
        let (store, _) = seeded_store().await;
        assert_eq!(store.clear().await, 3);
        assert!(store.is_empty().await);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_collection() {
        let store = store();
        let other = store.clone();
        store.add(&json!({"message": "shared"})).await.unwrap();
        assert_eq!(other.len().await, 1);
    }
}
