//! # CacheBox
//!
//! A parameter-keyed result cache with time-based expiry and optional
//! geospatial nearest-match lookup.
//!
//! CacheBox sits in front of an expensive or remote data source: callers
//! deposit a payload under a set of key parameters and later withdraw it by
//! supplying the same (or geospatially nearby) parameters, avoiding
//! recomputation within a validity window.
//!
//! ## Example
//!
//! ```rust
//! use cachebox::{CacheBox, CacheOptions, MemoryConnector, ParamSet};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> cachebox::Result<()> {
//! let cache = CacheBox::new(MemoryConnector::new(), CacheOptions::default().build());
//!
//! let mut params = ParamSet::new();
//! params.insert("city", json!("boston"));
//!
//! cache.deposit(params.clone(), json!({"temp": 54})).await?;
//! let hit = cache.withdraw(&params).await?;
//! assert_eq!(hit, Some(json!({"temp": 54})));
//! # Ok(())
//! # }
//! ```
//!
//! ## Geospatial mode
//!
//! Configure a maximum distance and unit (`m` or `ft`) to match deposits by
//! proximity instead of exact coordinates: the `lonlat` parameter then
//! becomes a nearest-neighbor constraint with the configured radius.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod controller;

pub use config::{CacheConfig, CacheOptions, StoreTarget};
pub use controller::CacheBox;

// Re-export the core vocabulary and the bundled backends
pub use cachebox_core::{
    CacheEntry, CacheError, DistanceUnit, EntryQuery, EntryStore, GeoConfig, ParamSet, Result,
    StoreConnector,
};
pub use cachebox_store::{FileConnector, FileStore, MemoryConnector, MemoryStore};
