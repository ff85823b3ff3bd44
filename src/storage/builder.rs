//! Storage builder and handles.
//!
//! Provides a builder pattern for constructing the storage layer
//! and a handles struct that owns its lifecycle.

use crate::storage::EntryStore;
use crate::validation::Limits;

/// Builder for constructing the storage layer.
#[derive(Debug, Default)]
pub struct StorageBuilder {
    limits: Limits,
}

impl StorageBuilder {
    /// Create a new storage builder with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all policy limits at once.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the maximum number of stored entries.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.limits.max_entries = max;
        self
    }

    /// Build the storage layer and return handles.
    pub fn build(self) -> StorageHandles {
        tracing::debug!(limits = ?self.limits, "Building entry store");
        StorageHandles {
            store: EntryStore::new(self.limits),
        }
    }
}

/// Handles to the storage layer.
#[derive(Debug)]
pub struct StorageHandles {
    /// Shared entry store; clone it into request handlers.
    pub store: EntryStore,
}

impl StorageHandles {
    /// Shut down the storage layer, discarding every entry.
    ///
    /// Returns the number of entries dropped.
    pub async fn shutdown(self) -> usize {
        let dropped = self.store.clear().await;
        tracing::info!(dropped, "Entry store cleared");
        dropped
    }
}
