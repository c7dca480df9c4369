//! Error types for the cachemgr library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: one variant per builder parameter that can fail
//!   validation, mirroring the [`CachePolicy`](crate::builder::CachePolicy)
//!   variants it guards.
//! - [`KeyNotFoundError`]: returned by the strict single-value `get` form on
//!   the ARC cache, which requires the key to be present.
//!
//! A plain miss is never an error; it is surfaced as `None` by the `Option`
//! returning lookups.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Each variant names the parameter that failed, so callers can match on the
/// cause instead of parsing a message.
///
/// # Example
///
/// ```
/// use cachemgr::builder::{CacheBuilder, CachePolicy};
/// use cachemgr::error::ConfigError;
///
/// let err = CacheBuilder::new(16)
///     .try_build::<u64, u64>(CachePolicy::LruK { k: 0 })
///     .unwrap_err();
/// assert_eq!(err, ConfigError::ZeroAdmissionThreshold);
/// assert!(err.to_string().contains("k"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// [`CachePolicy::LruK`](crate::builder::CachePolicy::LruK) was given
    /// `k = 0`; the admission filter needs at least one observation.
    ZeroAdmissionThreshold,
    /// [`CachePolicy::LfuAvg`](crate::builder::CachePolicy::LfuAvg) was
    /// given `max_avg_freq = 0`; resident frequencies are at least 1, so the
    /// average can never sit at or below a ceiling of zero.
    ZeroAgingCeiling,
}

impl ConfigError {
    /// Returns the description of the parameter that failed validation.
    pub fn message(&self) -> &'static str {
        match self {
            ConfigError::ZeroAdmissionThreshold => "lru-k admission threshold k must be >= 1",
            ConfigError::ZeroAgingCeiling => "lfu-avg ceiling max_avg_freq must be >= 1",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// KeyNotFoundError
// ---------------------------------------------------------------------------

/// Error returned by lookups that require the key to be present.
///
/// Only [`ArcCore::try_get`](crate::policy::arc::ArcCore::try_get) and its
/// concurrent wrapper use this; every other lookup reports a miss as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyNotFoundError;

impl fmt::Display for KeyNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found in cache")
    }
}

impl std::error::Error for KeyNotFoundError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
