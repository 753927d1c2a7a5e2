//! Cache entries: the unit of storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ParamSet;

/// A single cached record.
///
/// At most one live entry exists per distinct parameter set; a deposit
/// with an existing key overwrites payload and timestamp in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The full parameter set the payload was deposited under, including
    /// the `lonlat` coordinate when geospatial mode is active.
    pub params: ParamSet,
    /// The cached result.
    pub payload: Value,
    /// Milliseconds since epoch at last deposit.
    pub timestamp_ms: i64,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(params: ParamSet, payload: Value) -> Self {
        Self {
            params,
            payload,
            timestamp_ms: Self::now_ms(),
        }
    }

    /// Creates an entry with an explicit timestamp.
    pub fn with_timestamp(params: ParamSet, payload: Value, timestamp_ms: i64) -> Self {
        Self {
            params,
            payload,
            timestamp_ms,
        }
    }

    /// Returns true once the entry has outlived the expiry window.
    pub fn is_expired(&self, now_ms: i64, window_ms: i64) -> bool {
        self.timestamp_ms < now_ms - window_ms
    }

    /// Current time in milliseconds since epoch.
    pub fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
