//! File-backed entry store with snapshot persistence.
//!
//! Keeps entries in a memory store and periodically snapshots them to a
//! single file. Suitable for single-node deployments where cache contents
//! should survive a restart.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use cachebox_core::constants::{SNAPSHOT_HEADER_SIZE, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use cachebox_core::error::{CacheError, Result};
use cachebox_core::traits::{EntryStore, StoreConnector};
use cachebox_core::types::{CacheEntry, EntryQuery};

use crate::memory::{MemoryStore, StoreStats};

/// File-backed entry store.
///
/// Uses a memory store internally with periodic persistence to disk.
///
/// # Snapshot Format
///
/// ```text
/// magic (4 bytes): "CBOX"
/// version (1 byte): 1
/// count (8 bytes): number of entries, little-endian
/// entries (variable): JSON array of entries
/// ```
pub struct FileStore {
    /// Path to the snapshot file
    path: PathBuf,
    /// In-memory storage
    memory: MemoryStore,
    /// Whether there are unsaved changes
    dirty: AtomicBool,
    /// Auto-save threshold (save after N writes)
    auto_save_threshold: u64,
    /// Writes since last save
    writes_since_save: AtomicU64,
}

impl FileStore {
    /// Opens a file store at the given path.
    ///
    /// If the snapshot exists it is loaded; otherwise an empty store is
    /// created and the file appears on first save.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            memory: MemoryStore::new(),
            dirty: AtomicBool::new(false),
            auto_save_threshold: 100,
            writes_since_save: AtomicU64::new(0),
        };

        if store.path.exists() {
            store.load().await?;
        }

        Ok(store)
    }

    /// Opens a file store with a custom auto-save threshold.
    pub async fn with_auto_save(path: impl AsRef<Path>, threshold: u64) -> Result<Self> {
        let mut store = Self::open(path).await?;
        store.auto_save_threshold = threshold;
        Ok(store)
    }

    /// Loads entries from the snapshot file.
    #[instrument(skip(self))]
    async fn load(&self) -> Result<()> {
        let mut file = fs::File::open(&self.path).await?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;

        if contents.len() < SNAPSHOT_HEADER_SIZE {
            return Err(CacheError::Corrupt("snapshot too short".into()));
        }
        if &contents[0..4] != SNAPSHOT_MAGIC {
            return Err(CacheError::Corrupt("invalid magic bytes".into()));
        }
        let version = contents[4];
        if version != SNAPSHOT_VERSION {
            return Err(CacheError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                actual: version,
            });
        }

        let count = u64::from_le_bytes(
            contents[5..SNAPSHOT_HEADER_SIZE]
                .try_into()
                .map_err(|_| CacheError::Corrupt("invalid entry count".into()))?,
        );
        info!(count, "Loading entries from snapshot");

        if contents.len() > SNAPSHOT_HEADER_SIZE {
            let entries: Vec<CacheEntry> = serde_json::from_slice(&contents[SNAPSHOT_HEADER_SIZE..])?;
            self.memory.import(entries);
        }

        self.dirty.store(false, Ordering::SeqCst);
        debug!("Snapshot loaded");
        Ok(())
    }

    /// Writes the current entries to the snapshot file.
    ///
    /// The write is atomic: contents go to a temp file which is then
    /// renamed over the snapshot.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<()> {
        let entries = self.memory.all_entries();
        let count = entries.len() as u64;

        info!(count, path = ?self.path, "Saving snapshot");

        let serialized = serde_json::to_vec(&entries)?;

        let mut contents = Vec::with_capacity(SNAPSHOT_HEADER_SIZE + serialized.len());
        contents.extend_from_slice(SNAPSHOT_MAGIC);
        contents.push(SNAPSHOT_VERSION);
        contents.extend_from_slice(&count.to_le_bytes());
        contents.extend_from_slice(&serialized);

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.path).await?;

        self.dirty.store(false, Ordering::SeqCst);
        self.writes_since_save.store(0, Ordering::SeqCst);

        debug!("Snapshot saved");
        Ok(())
    }

    /// Checks if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Forces a save if dirty.
    pub async fn flush(&self) -> Result<()> {
        if self.is_dirty() {
            self.save().await?;
        }
        Ok(())
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying memory store for direct access.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        self.memory.stats()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Saves once enough writes have accumulated since the last save.
    async fn maybe_auto_save(&self) -> Result<()> {
        let writes = self.writes_since_save.fetch_add(1, Ordering::SeqCst);
        if writes >= self.auto_save_threshold {
            self.save().await?;
        }
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        // Best-effort warning only; async save is not possible in Drop
        if self.is_dirty() {
            warn!("FileStore dropped with unsaved changes");
        }
    }
}

#[async_trait]
impl EntryStore for FileStore {
    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        self.memory.upsert(entry).await?;
        self.dirty.store(true, Ordering::SeqCst);
        self.maybe_auto_save().await?;
        Ok(())
    }

    async fn find_one(&self, query: &EntryQuery) -> Result<Option<CacheEntry>> {
        self.memory.find_one(query).await
    }

    async fn delete_older_than(&self, cutoff_ms: i64) -> Result<u64> {
        let removed = self.memory.delete_older_than(cutoff_ms).await?;
        if removed > 0 {
            self.dirty.store(true, Ordering::SeqCst);
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<u64> {
        self.memory.count().await
    }
}

/// Connector opening a file store at a fixed path.
#[derive(Clone, Debug)]
pub struct FileConnector {
    path: PathBuf,
    auto_save_threshold: u64,
}

impl FileConnector {
    /// Creates a connector for the given snapshot path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            auto_save_threshold: 100,
        }
    }

    /// Sets the auto-save threshold.
    pub fn auto_save_threshold(mut self, threshold: u64) -> Self {
        self.auto_save_threshold = threshold;
        self
    }
}

#[async_trait]
impl StoreConnector for FileConnector {
    async fn connect(&self) -> Result<Arc<dyn EntryStore>> {
        let store = FileStore::with_auto_save(&self.path, self.auto_save_threshold).await?;
        info!(path = ?self.path, entries = store.len(), "File store connected");
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachebox_core::types::ParamSet;
    use serde_json::json;
    use tempfile::tempdir;

    fn make_params(city: &str) -> ParamSet {
        let mut params = ParamSet::new();
        params.insert("city", json!(city));
        params
    }

    fn make_entry(city: &str, payload: u64) -> CacheEntry {
        CacheEntry::new(make_params(city), json!(payload))
    }

    #[tokio::test]
    async fn test_open_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        let store = FileStore::open(&path).await.unwrap();
        assert!(store.is_empty());
        assert!(!path.exists()); // File not created until save
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.upsert(make_entry("boston", 1)).await.unwrap();
            store.upsert(make_entry("cambridge", 2)).await.unwrap();
            store.save().await.unwrap();
        }

        {
            let store = FileStore::open(&path).await.unwrap();
            assert_eq!(store.len(), 2);

            let query = EntryQuery::for_params(&make_params("boston"), None);
            let found = store.find_one(&query).await.unwrap().unwrap();
            assert_eq!(found.payload, json!(1));
        }
    }

    #[tokio::test]
    async fn test_dirty_tracking() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        let store = FileStore::open(&path).await.unwrap();
        assert!(!store.is_dirty());

        store.upsert(make_entry("boston", 1)).await.unwrap();
        assert!(store.is_dirty());

        store.save().await.unwrap();
        assert!(!store.is_dirty());
    }

    #[tokio::test]
    async fn test_auto_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        // Auto-save triggers once writes_since_save reaches the threshold
        let store = FileStore::with_auto_save(&path, 2).await.unwrap();
        store.upsert(make_entry("a", 1)).await.unwrap();
        store.upsert(make_entry("b", 2)).await.unwrap();
        store.upsert(make_entry("c", 3)).await.unwrap();

        let reloaded = FileStore::open(&path).await.unwrap();
        assert_eq!(reloaded.len(), 3);
    }

    #[tokio::test]
    async fn test_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        let store = FileStore::open(&path).await.unwrap();
        store.upsert(make_entry("boston", 1)).await.unwrap();

        store.flush().await.unwrap();
        assert!(!store.is_dirty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_purge_marks_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        let store = FileStore::open(&path).await.unwrap();
        store
            .upsert(CacheEntry::with_timestamp(make_params("old"), json!(1), 100))
            .await
            .unwrap();
        store.save().await.unwrap();

        let removed = store.delete_older_than(500).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.is_dirty());
    }

    #[tokio::test]
    async fn test_invalid_snapshot_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        fs::write(&path, b"invalid data").await.unwrap();
        let result = FileStore::open(&path).await;
        assert!(matches!(result, Err(CacheError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        let mut contents = Vec::new();
        contents.extend_from_slice(SNAPSHOT_MAGIC);
        contents.push(99); // future version
        contents.extend_from_slice(&0u64.to_le_bytes());
        fs::write(&path, &contents).await.unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(
            result,
            Err(CacheError::VersionMismatch { actual: 99, .. })
        ));
    }

    #[tokio::test]
    async fn test_atomic_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");
        let temp_path = path.with_extension("tmp");

        let store = FileStore::open(&path).await.unwrap();
        store.upsert(make_entry("boston", 1)).await.unwrap();
        store.save().await.unwrap();

        // Temp file should not exist after save
        assert!(!temp_path.exists());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_connector() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.cbox");

        let connector = FileConnector::new(&path).auto_save_threshold(0);
        let store = connector.connect().await.unwrap();
        store.upsert(make_entry("boston", 1)).await.unwrap();

        // Threshold 0 saves on every write; a fresh connect sees the entry
        let store2 = connector.connect().await.unwrap();
        assert_eq!(store2.count().await.unwrap(), 1);
    }
}
