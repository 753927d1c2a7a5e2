//! In-memory entry store.
//!
//! Fast, thread-safe storage suitable for development, testing, and
//! single-process deployments.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use cachebox_core::error::Result;
use cachebox_core::traits::{EntryStore, StoreConnector};
use cachebox_core::types::{CacheEntry, EntryQuery};

/// Running counters for one store instance.
#[derive(Clone, Debug, Default)]
pub struct StoreStats {
    /// Upserts performed.
    pub deposits: u64,
    /// Lookups that returned an entry.
    pub hits: u64,
    /// Lookups that returned nothing.
    pub misses: u64,
    /// Entries removed by expiry sweeps.
    pub purged: u64,
}

/// In-memory entry store.
///
/// Entries are indexed by the canonical key of their parameter set, so the
/// at-most-one-entry-per-key invariant holds by construction and upserts
/// are atomic per key (last-writer-wins).
///
/// # Thread Safety
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Primary storage: canonical key → entry
    entries: DashMap<String, CacheEntry>,
    /// Store statistics
    stats: RwLock<StoreStats>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            stats: RwLock::new(StoreStats::default()),
        }
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> StoreStats {
        self.stats.read().clone()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries (for export/snapshot).
    pub fn all_entries(&self) -> Vec<CacheEntry> {
        self.entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Imports entries, keeping the last one per canonical key.
    pub fn import(&self, entries: Vec<CacheEntry>) -> usize {
        let mut imported = 0;
        for entry in entries {
            self.entries.insert(entry.params.canonical_key(), entry);
            imported += 1;
        }
        imported
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    /// Inserts or replaces the entry under its canonical key.
    #[instrument(skip(self, entry))]
    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        let key = entry.params.canonical_key();
        debug!(key = %key, "Upserting entry");
        self.entries.insert(key, entry);
        self.stats.write().deposits += 1;
        Ok(())
    }

    /// Scans for a matching entry.
    ///
    /// With a proximity constraint the nearest candidate by spherical
    /// distance wins; otherwise the single exact match is returned (unique
    /// by construction of the key index).
    #[instrument(skip(self, query))]
    async fn find_one(&self, query: &EntryQuery) -> Result<Option<CacheEntry>> {
        let found = if query.proximity.is_some() {
            let mut best: Option<(f64, CacheEntry)> = None;
            for entry in self.entries.iter() {
                if !query.matches(entry.value()) {
                    continue;
                }
                // matches() guarantees a usable coordinate here
                let Some(distance) = query.distance_to(entry.value()) else {
                    continue;
                };
                if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                    best = Some((distance, entry.value().clone()));
                }
            }
            best.map(|(_, entry)| entry)
        } else {
            self.entries
                .iter()
                .find(|entry| query.matches(entry.value()))
                .map(|entry| entry.value().clone())
        };

        let mut stats = self.stats.write();
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        debug!(hit = found.is_some(), "Lookup finished");
        Ok(found)
    }

    /// Removes entries older than the cutoff.
    #[instrument(skip(self))]
    async fn delete_older_than(&self, cutoff_ms: i64) -> Result<u64> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().timestamp_ms < cutoff_ms)
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0u64;
        for key in expired {
            // Re-check under the shard lock so a racing refresh survives
            if self
                .entries
                .remove_if(&key, |_, entry| entry.timestamp_ms < cutoff_ms)
                .is_some()
            {
                removed += 1;
            }
        }

        if removed > 0 {
            self.stats.write().purged += removed;
            debug!(removed, cutoff_ms, "Purged expired entries");
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.len() as u64)
    }
}

/// Connector handing out a shared in-memory store.
///
/// The same store instance is returned on every `connect`, so separate
/// cache handles built from one connector observe the same entries.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    /// Creates a connector with a fresh store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector around an existing store.
    pub fn shared(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store for direct inspection.
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn EntryStore>> {
        info!("Memory store connected");
        Ok(self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachebox_core::geo::{DistanceUnit, GeoConfig};
    use cachebox_core::types::ParamSet;
    use serde_json::json;

    fn make_params(city: &str) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert("city", json!(city));
        params
    }

    fn make_geo_params(city: &str, lon: f64, lat: f64) -> ParamSet {
        let mut params = make_params(city);
        params.insert("lonlat", json!([lon, lat]));
        params
    }

    fn geo_1km() -> GeoConfig {
        GeoConfig::new(1000.0, DistanceUnit::Meters).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_find() {
        let store = MemoryStore::new();
        let params = make_params("boston");
        store
            .upsert(CacheEntry::new(params.clone(), json!({"temp": 54})))
            .await
            .unwrap();

        let query = EntryQuery::for_params(&params, None);
        let found = store.find_one(&query).await.unwrap().unwrap();
        assert_eq!(found.payload, json!({"temp": 54}));
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = MemoryStore::new();
        let params = make_params("boston");

        store
            .upsert(CacheEntry::with_timestamp(params.clone(), json!(1), 100))
            .await
            .unwrap();
        store
            .upsert(CacheEntry::with_timestamp(params.clone(), json!(2), 200))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let query = EntryQuery::for_params(&params, None);
        let found = store.find_one(&query).await.unwrap().unwrap();
        assert_eq!(found.payload, json!(2));
        assert_eq!(found.timestamp_ms, 200);
    }

    #[tokio::test]
    async fn test_find_miss() {
        let store = MemoryStore::new();
        let query = EntryQuery::for_params(&make_params("nowhere"), None);
        assert!(store.find_one(&query).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_older_than_exact() {
        let store = MemoryStore::new();
        store
            .upsert(CacheEntry::with_timestamp(make_params("old"), json!(1), 100))
            .await
            .unwrap();
        store
            .upsert(CacheEntry::with_timestamp(make_params("new"), json!(2), 900))
            .await
            .unwrap();

        let removed = store.delete_older_than(500).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);

        // Second sweep is a no-op
        let removed = store.delete_older_than(500).await.unwrap();
        assert_eq!(removed, 0);

        let query = EntryQuery::for_params(&make_params("new"), None);
        assert!(store.find_one(&query).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_nearest_entry_wins() {
        let store = MemoryStore::new();
        store
            .upsert(CacheEntry::new(
                make_geo_params("boston", 0.005, 0.0),
                json!("farther"),
            ))
            .await
            .unwrap();
        store
            .upsert(CacheEntry::new(
                make_geo_params("boston", 0.001, 0.0),
                json!("nearer"),
            ))
            .await
            .unwrap();

        let query = EntryQuery::for_params(&make_geo_params("boston", 0.0, 0.0), Some(&geo_1km()));
        let found = store.find_one(&query).await.unwrap().unwrap();
        assert_eq!(found.payload, json!("nearer"));
    }

    #[tokio::test]
    async fn test_outside_radius_misses() {
        let store = MemoryStore::new();
        store
            .upsert(CacheEntry::new(
                make_geo_params("boston", 0.5, 0.0),
                json!("far away"),
            ))
            .await
            .unwrap();

        let query = EntryQuery::for_params(&make_geo_params("boston", 0.0, 0.0), Some(&geo_1km()));
        assert!(store.find_one(&query).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_tracking() {
        let store = MemoryStore::new();
        let params = make_params("boston");
        store
            .upsert(CacheEntry::new(params.clone(), json!(1)))
            .await
            .unwrap();

        let hit_query = EntryQuery::for_params(&params, None);
        store.find_one(&hit_query).await.unwrap();
        let miss_query = EntryQuery::for_params(&make_params("nowhere"), None);
        store.find_one(&miss_query).await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.deposits, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_concurrent_same_key_upserts() {
        use tokio::task::JoinSet;

        let store = Arc::new(MemoryStore::new());
        let mut tasks = JoinSet::new();

        for i in 0..100u64 {
            let store = store.clone();
            tasks.spawn(async move {
                let entry = CacheEntry::new(make_params("boston"), json!(i));
                store.upsert(entry).await.unwrap();
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        // One entry survives, holding one of the deposited payloads intact
        assert_eq!(store.len(), 1);
        let query = EntryQuery::for_params(&make_params("boston"), None);
        let found = store.find_one(&query).await.unwrap().unwrap();
        let value = found.payload.as_u64().unwrap();
        assert!(value < 100);
    }

    #[tokio::test]
    async fn test_memory_connector_shares_store() {
        let connector = MemoryConnector::new();
        let a = connector.connect().await.unwrap();
        let b = connector.connect().await.unwrap();

        a.upsert(CacheEntry::new(make_params("boston"), json!(1)))
            .await
            .unwrap();
        assert_eq!(b.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_deduplicates() {
        let store = MemoryStore::new();
        let imported = store.import(vec![
            CacheEntry::with_timestamp(make_params("boston"), json!(1), 100),
            CacheEntry::with_timestamp(make_params("boston"), json!(2), 200),
        ]);
        assert_eq!(imported, 2);
        assert_eq!(store.len(), 1);
    }
}
