//! Lookup queries: the canonical predicate built from a parameter set.
//!
//! Every field except the coordinate becomes an exact-match predicate.
//! With geospatial mode active and a valid coordinate supplied, the
//! coordinate folds into a nearest-neighbor constraint instead.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::constants::LONLAT_FIELD;
use crate::geo::{self, GeoConfig};

use super::{CacheEntry, ParamSet};

/// A spherical nearest-neighbor constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityFilter {
    /// Query center as `[longitude, latitude]` in degrees.
    pub center: [f64; 2],
    /// Maximum central angle in radians.
    pub max_distance: f64,
}

impl ProximityFilter {
    /// Central angle between the query center and a candidate coordinate.
    pub fn distance_to(&self, lonlat: [f64; 2]) -> f64 {
        geo::spherical_angle(self.center, lonlat)
    }

    /// Returns true if the coordinate lies within the match radius.
    pub fn contains(&self, lonlat: [f64; 2]) -> bool {
        self.distance_to(lonlat) <= self.max_distance
    }
}

/// The canonical lookup predicate for one withdrawal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryQuery {
    /// Exact-match predicates over every non-coordinate field.
    pub equality: BTreeMap<String, Value>,
    /// Optional proximity constraint replacing the coordinate field.
    pub proximity: Option<ProximityFilter>,
}

impl EntryQuery {
    /// Builds the lookup predicate for a parameter set.
    ///
    /// The coordinate field only becomes a proximity constraint when
    /// geospatial mode is configured *and* the supplied value parses as a
    /// coordinate; otherwise it is dropped from the query and matching
    /// proceeds on the remaining equality fields (lenient policy).
    pub fn for_params(params: &ParamSet, geo_config: Option<&GeoConfig>) -> Self {
        let equality: BTreeMap<String, Value> = params
            .iter()
            .filter(|(key, _)| key.as_str() != LONLAT_FIELD)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let proximity = geo_config.and_then(|geo| {
            let center = geo::normalize_lonlat(params.lonlat()?)?;
            Some(ProximityFilter {
                center,
                max_distance: geo.max_distance,
            })
        });

        Self {
            equality,
            proximity,
        }
    }

    /// Returns true if an entry satisfies every predicate in this query.
    ///
    /// Entries may carry fields beyond those queried; only the queried
    /// fields must match.
    pub fn matches(&self, entry: &CacheEntry) -> bool {
        let equality_ok = self
            .equality
            .iter()
            .all(|(key, value)| entry.params.get(key) == Some(value));
        if !equality_ok {
            return false;
        }

        match &self.proximity {
            Some(filter) => match self.entry_lonlat(entry) {
                Some(lonlat) => filter.contains(lonlat),
                None => false,
            },
            None => true,
        }
    }

    /// Spherical distance from the query center to an entry, if both
    /// sides carry a usable coordinate.
    pub fn distance_to(&self, entry: &CacheEntry) -> Option<f64> {
        let filter = self.proximity.as_ref()?;
        let lonlat = self.entry_lonlat(entry)?;
        Some(filter.distance_to(lonlat))
    }

    fn entry_lonlat(&self, entry: &CacheEntry) -> Option<[f64; 2]> {
        geo::normalize_lonlat(entry.params.lonlat()?)
    }
}
