//! Error types for CacheBox.
//!
//! This module provides the error hierarchy for the whole workspace using
//! `thiserror`. Store failures are propagated verbatim and never retried by
//! the cache logic; a cache miss is *not* an error and is represented as
//! `Ok(None)` by lookup operations.

use thiserror::Error;

/// Result type alias using `CacheError`.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Main error type for all CacheBox operations.
#[derive(Debug, Error)]
pub enum CacheError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CALLER ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// A required input was absent or empty. Fails fast: no store access
    /// is attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The connection URI could not be parsed.
    #[error("Invalid store URI: {0}")]
    InvalidUri(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// A failure reported by the backing store (connection, provisioning,
    /// query execution). Propagated unchanged to the caller.
    #[error("Store error: {0}")]
    Store(String),

    /// A persisted snapshot failed structural validation.
    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),

    /// A persisted snapshot was written by an incompatible format version.
    #[error("Snapshot version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build reads and writes.
        expected: u8,
        /// Version found in the snapshot header.
        actual: u8,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // WRAPPED ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Returns true if this error was caused by bad caller input.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidArgument(_) | CacheError::InvalidUri(_)
        )
    }

    /// Returns true if this error originated in the backing store.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            CacheError::Store(_)
                | CacheError::Corrupt(_)
                | CacheError::VersionMismatch { .. }
                | CacheError::Io(_)
        )
    }
}
