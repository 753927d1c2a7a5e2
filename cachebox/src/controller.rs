//! The cache controller: deposit, withdraw, and purge.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use cachebox_core::error::{CacheError, Result};
use cachebox_core::traits::{EntryStore, StoreConnector};
use cachebox_core::types::{CacheEntry, EntryQuery, ParamSet};

use crate::config::CacheConfig;

/// The parameter-keyed cache.
///
/// Cheaply clonable; all clones share one configuration and one lazily
/// opened store handle. The controller holds no in-process entry state of
/// its own, so correctness under concurrency reduces to the store's
/// atomicity guarantees for upsert and delete.
///
/// # Lifecycle
///
/// The controller starts `Uninitialized`. The first operation performs the
/// bootstrap (open connection, provision indexes) through the connector and
/// transitions to `Ready`; concurrent first callers coalesce into a single
/// bootstrap. A bootstrap failure is surfaced to the triggering caller and
/// the next call retries.
#[derive(Clone)]
pub struct CacheBox {
    inner: Arc<Inner>,
}

struct Inner {
    config: CacheConfig,
    connector: Box<dyn StoreConnector>,
    store: OnceCell<Arc<dyn EntryStore>>,
}

impl CacheBox {
    /// Creates a cache over the given connector and configuration.
    ///
    /// No connection is opened until the first operation.
    pub fn new(connector: impl StoreConnector + 'static, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                connector: Box::new(connector),
                store: OnceCell::new(),
            }),
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Returns true once the store connection has been established.
    pub fn is_ready(&self) -> bool {
        self.inner.store.initialized()
    }

    /// Returns the store handle, bootstrapping on first use.
    ///
    /// Single-flight: concurrent callers while `Uninitialized` share one
    /// `connect`; on failure the cell stays empty and the next call
    /// retries.
    async fn store(&self) -> Result<Arc<dyn EntryStore>> {
        let inner = &self.inner;
        let store = inner
            .store
            .get_or_try_init(|| async {
                debug!("Bootstrapping store connection");
                let store = inner.connector.connect().await?;
                info!(
                    collection = %inner.config.collection_name,
                    geospatial = inner.config.geospatial.is_some(),
                    "CacheBox ready"
                );
                Ok::<_, CacheError>(store)
            })
            .await?;
        Ok(store.clone())
    }

    /// Deposits a payload under a set of key parameters.
    ///
    /// If geospatial mode is active and `params.lonlat` parses as a
    /// coordinate, it is canonicalized in place; a malformed coordinate is
    /// kept verbatim and the deposit proceeds. Depositing under an existing
    /// key overwrites payload and timestamp atomically.
    #[instrument(skip(self, params, payload))]
    pub async fn deposit(&self, mut params: ParamSet, payload: Value) -> Result<()> {
        if params.is_empty() || payload.is_null() {
            return Err(CacheError::InvalidArgument(
                "must provide params and payload to make a deposit".into(),
            ));
        }

        if self.inner.config.geospatial.is_some() {
            params.normalize_lonlat();
        }

        let store = self.store().await?;
        store.upsert(CacheEntry::new(params, payload)).await
    }

    /// Withdraws the payload cached under (or geospatially near) the
    /// given parameters.
    ///
    /// Triggers an opportunistic detached purge first; the withdrawal
    /// never waits on or fails because of the purge outcome. A miss is a
    /// normal outcome, returned as `Ok(None)`.
    #[instrument(skip(self, params))]
    pub async fn withdraw(&self, params: &ParamSet) -> Result<Option<Value>> {
        if params.is_empty() {
            return Err(CacheError::InvalidArgument(
                "must provide params to make a withdrawal".into(),
            ));
        }

        let store = self.store().await?;

        // Purge on every withdraw; the task is detached and its outcome dropped
        let purger = self.clone();
        tokio::spawn(async move {
            if let Err(err) = purger.purge().await {
                debug!(%err, "Opportunistic purge failed");
            }
        });

        let query = EntryQuery::for_params(params, self.inner.config.geospatial.as_ref());
        match store.find_one(&query).await? {
            Some(entry) if !entry.payload.is_null() => Ok(Some(entry.payload)),
            _ => Ok(None),
        }
    }

    /// Deletes every entry older than the expiry window.
    ///
    /// Returns the number of entries removed. Idempotent and safe to call
    /// concurrently with itself and with deposit/withdraw. This is the
    /// cache's only eviction mechanism: age-based, lazily triggered on
    /// withdraw, with no size bound.
    #[instrument(skip(self))]
    pub async fn purge(&self) -> Result<u64> {
        let store = self.store().await?;
        let cutoff = CacheEntry::now_ms() - self.inner.config.time_to_expire_ms;
        let removed = store.delete_older_than(cutoff).await?;
        if removed > 0 {
            debug!(removed, "Purged expired entries");
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for CacheBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBox")
            .field("config", &self.inner.config)
            .field("ready", &self.is_ready())
            .finish()
    }
}
