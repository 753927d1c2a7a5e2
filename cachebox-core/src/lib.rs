//! # CacheBox Core
//!
//! Core types, errors, and traits for the CacheBox parameter-keyed cache.
//!
//! This crate provides the foundational building blocks used by the other
//! CacheBox crates:
//!
//! - **Types**: Parameter sets, cache entries, and lookup queries
//! - **Geo**: Coordinate normalization and spherical distance math
//! - **Errors**: Comprehensive error types with context
//! - **Constants**: Defaults and physical constants
//! - **Traits**: Store interfaces for pluggable backends
//!
//! ## Example
//!
//! ```rust
//! use cachebox_core::{CacheEntry, ParamSet};
//! use serde_json::json;
//!
//! let mut params = ParamSet::new();
//! params.insert("city", json!("boston"));
//! let entry = CacheEntry::new(params, json!({"temp": 54}));
//! assert!(!entry.is_expired(entry.timestamp_ms, 1000));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod geo;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CacheError, Result};
pub use geo::{DistanceUnit, GeoConfig};
pub use traits::{EntryStore, StoreConnector};
pub use types::*;
