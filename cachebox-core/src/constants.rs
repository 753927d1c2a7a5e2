//! Constants for CacheBox.
//!
//! Physical constants are used to normalize caller-supplied distances into
//! the radian threshold consumed by spherical proximity queries.

// ═══════════════════════════════════════════════════════════════════════════════
// EARTH RADII
// ═══════════════════════════════════════════════════════════════════════════════
// Source: WolframAlpha. Dividing a surface distance by the radius in the
// same unit yields the central angle in radians.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6_367.5;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1_000.0;

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MI: f64 = 3_956.6;

/// Mean Earth radius in feet.
pub const EARTH_RADIUS_FT: f64 = EARTH_RADIUS_MI * 5_280.0;

// ═══════════════════════════════════════════════════════════════════════════════
// FIELD NAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Parameter field holding the `[longitude, latitude]` coordinate pair.
///
/// When geospatial mode is active this field is excluded from equality
/// matching and folded into the proximity predicate instead.
pub const LONLAT_FIELD: &str = "lonlat";

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default entry lifetime before purge eligibility: one day.
pub const DEFAULT_TIME_TO_EXPIRE_MS: i64 = 24 * 60 * 60 * 1000;

/// Default collection name for cache entries.
pub const DEFAULT_COLLECTION: &str = "cachebox";

/// Default store host when the connection URI omits one.
pub const DEFAULT_HOST: &str = "localhost";

/// Default store port when the connection URI omits one.
pub const DEFAULT_PORT: u16 = 27017;

// ═══════════════════════════════════════════════════════════════════════════════
// SNAPSHOT FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Magic bytes at the head of a file-store snapshot.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"CBOX";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Snapshot header size: magic (4) + version (1) + entry count (8).
pub const SNAPSHOT_HEADER_SIZE: usize = 13;
