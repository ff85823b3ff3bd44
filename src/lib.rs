//! DevLog - Developer Journal Library
//!
//! This crate provides the core of the DevLog journal service: a validated,
//! in-memory entry store and the JSON REST API in front of it. It can be used
//! as a library, or run as a standalone binary with the `devlog` executable.
//!
//! # Architecture
//!
//! - **Validation**: Field rules, sanitization and HTML escaping for untrusted input
//! - **Storage**: Ordered in-memory entry store with search and statistics
//! - **Server**: Axum router with security headers, CORS, and rate limiting
//! - **Config**: YAML configuration with environment overrides
//!
//! # Example
//!
//! ```
//! use devlog::StorageBuilder;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), devlog::StorageError> {
//! let handles = StorageBuilder::new().max_entries(100).build();
//! let entry = handles
//!     .store
//!     .add(&json!({"message": "Fixed bug #42", "tags": ["backend", "urgent"]}))
//!     .await?;
//!
//! assert_eq!(entry.id.len(), 36);
//! assert_eq!(handles.store.statistics().await.total_tags, 2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod validation;

pub use error::ErrorKind;
pub use storage::{
    Entry, EntryQuery, EntryStore, SortOrder, Statistics, StorageBuilder, StorageError,
    StorageHandles,
};
pub use validation::{Limits, ValidationError, Validator};
