//! Storage Layer
//!
//! In-memory entry storage with a single collection-wide lock:
//! - **Writes** (add/update/delete/restore/clear) hold the write guard for the
//!   whole operation, so mutations never interleave
//! - **Reads** (list/get/search/statistics) work on one consistent snapshot
//!
//! Nothing is written to disk; a process restart is a full reset.
//!
//! # Components
//!
//! - [`EntryStore`]: Entry CRUD, search, bulk restore, and statistics
//! - [`Entry`] / [`Statistics`] / [`EntryQuery`]: Data and query types
//! - [`StorageBuilder`] / [`StorageHandles`]: Initialization and lifecycle management

mod builder;
mod entry_store;
mod error;
mod types;

pub use builder::{StorageBuilder, StorageHandles};
pub use entry_store::EntryStore;
pub use error::StorageError;
pub use types::{Entry, EntryQuery, SortOrder, Statistics, TOP_N};
