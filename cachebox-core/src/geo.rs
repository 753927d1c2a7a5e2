//! Coordinate normalization and spherical distance math.
//!
//! CacheBox runs proximity lookups on the unit sphere: a caller-supplied
//! maximum distance is divided by Earth's radius in the same unit, yielding
//! a radian threshold that is compared against the haversine central angle
//! between coordinates.
//!
//! Coordinate validation is deliberately lenient: a value that does not
//! parse as a `[longitude, latitude]` pair is left untouched and the
//! operation proceeds on the remaining parameters, rather than failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{EARTH_RADIUS_FT, EARTH_RADIUS_M};

/// Distance unit accepted for geospatial configuration.
///
/// Only meters and feet are recognized; any other unit string disables
/// geospatial mode for the cache instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    /// Meters (`"m"`).
    Meters,
    /// Feet (`"ft"`).
    Feet,
}

impl DistanceUnit {
    /// Parses a unit string. Returns `None` for anything but `"m"` / `"ft"`.
    pub fn parse(unit: &str) -> Option<Self> {
        match unit {
            "m" => Some(DistanceUnit::Meters),
            "ft" => Some(DistanceUnit::Feet),
            _ => None,
        }
    }

    /// Earth's radius expressed in this unit.
    pub fn earth_radius(&self) -> f64 {
        match self {
            DistanceUnit::Meters => EARTH_RADIUS_M,
            DistanceUnit::Feet => EARTH_RADIUS_FT,
        }
    }

    /// Normalizes a surface distance into a radian central angle.
    ///
    /// Returns `None` for non-finite or negative distances.
    pub fn normalize(&self, max_dist: f64) -> Option<f64> {
        if !max_dist.is_finite() || max_dist < 0.0 {
            return None;
        }
        Some(max_dist / self.earth_radius())
    }
}

/// Geospatial configuration: the normalized proximity threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoConfig {
    /// Maximum match distance as a radian central angle.
    pub max_distance: f64,
}

impl GeoConfig {
    /// Builds a geospatial config from a raw distance and unit.
    ///
    /// Returns `None` when the distance cannot be normalized, which
    /// disables geospatial mode entirely.
    pub fn new(max_dist: f64, unit: DistanceUnit) -> Option<Self> {
        unit.normalize(max_dist)
            .map(|max_distance| Self { max_distance })
    }
}

/// Validates and canonicalizes a candidate coordinate value.
///
/// Returns `Some([longitude, latitude])` iff the value is an array of
/// exactly two elements, each a finite number or a string parsing as one.
/// Anything else returns `None` and the caller proceeds without coordinate
/// normalization.
pub fn normalize_lonlat(value: &Value) -> Option<[f64; 2]> {
    let items = value.as_array()?;
    if items.len() != 2 {
        return None;
    }
    let lon = coerce_finite(&items[0])?;
    let lat = coerce_finite(&items[1])?;
    Some([lon, lat])
}

/// Coerces a JSON value to a finite float, accepting numeric strings.
fn coerce_finite(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Central angle in radians between two `[longitude, latitude]` pairs
/// given in degrees, via the haversine formula.
pub fn spherical_angle(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lon1, lat1) = (a[0].to_radians(), a[1].to_radians());
    let (lon2, lat2) = (b[0].to_radians(), b[1].to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}
