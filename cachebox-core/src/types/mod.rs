//! Core types for CacheBox.

mod entry;
mod params;
mod query;

pub use entry::CacheEntry;
pub use params::ParamSet;
pub use query::{EntryQuery, ProximityFilter};
