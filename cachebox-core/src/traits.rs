//! Store traits for CacheBox.
//!
//! These traits define the contract between the cache controller and the
//! persistent store, enabling pluggable backends and testing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CacheEntry, EntryQuery};

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for cache entry storage.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - A local snapshot file (for single-node deployments)
/// - A remote document store (for shared deployments)
///
/// Entries are keyed on [`ParamSet::canonical_key`]; implementations must
/// keep at most one live entry per distinct key.
///
/// [`ParamSet::canonical_key`]: crate::types::ParamSet::canonical_key
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Inserts or replaces the entry stored under its parameter set.
    ///
    /// Must be atomic with respect to the uniqueness invariant: concurrent
    /// upserts with the same key never create duplicates, and the survivor
    /// is one complete entry (last-writer-wins).
    async fn upsert(&self, entry: CacheEntry) -> Result<()>;

    /// Finds at most one entry satisfying the query.
    ///
    /// With a proximity constraint, the nearest matching entry by
    /// spherical distance is returned.
    async fn find_one(&self, query: &EntryQuery) -> Result<Option<CacheEntry>>;

    /// Deletes every entry with `timestamp_ms < cutoff_ms`.
    ///
    /// Returns the number of entries removed. Idempotent.
    async fn delete_older_than(&self, cutoff_ms: i64) -> Result<u64>;

    /// Returns the total entry count.
    async fn count(&self) -> Result<u64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORE CONNECTOR TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for opening a store connection.
///
/// `connect` owns the whole bootstrap: opening/authenticating the
/// connection and provisioning the collection and indexes. The controller
/// calls it lazily on first use and caches the handle; a failure is
/// surfaced to the triggering caller and retried on the next call.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Opens the store and returns a ready-to-use handle.
    async fn connect(&self) -> Result<Arc<dyn EntryStore>>;
}
