//! Parameter sets: the addressing unit of the cache.
//!
//! A `ParamSet` is an arbitrary mapping from field name to JSON value.
//! Backed by a `BTreeMap` so the canonical key encoding is deterministic
//! regardless of insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::LONLAT_FIELD;
use crate::geo;

/// An ordered set of key parameters addressing one cache entry.
///
/// When geospatial mode is active, the [`LONLAT_FIELD`] field holds a
/// 2-element `[longitude, latitude]` coordinate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet {
    fields: BTreeMap<String, Value>,
}

impl ParamSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Looks up a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Returns the coordinate field, if present.
    pub fn lonlat(&self) -> Option<&Value> {
        self.fields.get(LONLAT_FIELD)
    }

    /// Canonicalizes the coordinate field in place.
    ///
    /// If the `lonlat` value parses as a 2-element numeric coordinate it is
    /// rewritten as a plain `[f64, f64]` array. Anything else is left
    /// untouched: the deposit or lookup proceeds on the remaining fields
    /// (lenient policy).
    pub fn normalize_lonlat(&mut self) {
        if let Some(value) = self.fields.get(LONLAT_FIELD) {
            if let Some([lon, lat]) = geo::normalize_lonlat(value) {
                self.fields
                    .insert(LONLAT_FIELD.to_string(), serde_json::json!([lon, lat]));
            }
        }
    }

    /// Deterministic lookup key over the full parameter set.
    ///
    /// Two parameter sets with the same fields produce the same key; the
    /// store's primary index is keyed on this string, which is what makes
    /// the at-most-one-entry-per-key invariant hold by construction.
    pub fn canonical_key(&self) -> String {
        // BTreeMap serializes in key order, so this is stable.
        serde_json::to_string(&self.fields).unwrap_or_default()
    }
}

impl From<BTreeMap<String, Value>> for ParamSet {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(String, Value)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
