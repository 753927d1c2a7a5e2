//! # CacheBox Store
//!
//! Entry store backends for the CacheBox cache.
//!
//! This crate provides two storage backends:
//!
//! - **Memory**: Fast in-memory storage for development and testing
//! - **File**: Persistent snapshot-file storage for single-node deployments
//!
//! Both enforce the at-most-one-entry-per-key invariant by indexing on the
//! canonical key of the parameter set.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cachebox_store::MemoryStore;
//! use cachebox_core::EntryStore;
//!
//! let store = MemoryStore::new();
//! store.upsert(entry).await?;
//! let hit = store.find_one(&query).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;

pub use file::{FileConnector, FileStore};
pub use memory::{MemoryConnector, MemoryStore, StoreStats};

// Re-export the traits from core
pub use cachebox_core::traits::{EntryStore, StoreConnector};
