//! Configuration Module
//!
//! Handles loading, defaulting and validating cache construction parameters.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CacheError, Result};

// == Limits ==
/// Smallest bucket table accepted at creation
pub const MIN_BUCKETS: usize = 128;

/// Bucket table size used when the caller passes 0
pub const DEFAULT_BUCKETS: usize = 4096;

/// Smallest non-zero aggregate size bound accepted at creation (1 MiB)
pub const MIN_MAX_SIZE: usize = 1024 * 1024;

/// Cache construction parameters.
///
/// Zero means "use the default" for `buckets`, "unbounded" for `max_size`
/// and "no expiry" for `ttl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of hash buckets (fixed for the lifetime of the cache)
    pub buckets: usize,
    /// Aggregate size ceiling in bytes, 0 = unbounded
    pub max_size: usize,
    /// Maximum number of live entries, defaults to the bucket count
    pub max_entries: Option<usize>,
    /// Time-to-live in seconds, 0 = entries never expire
    pub ttl: u64,
    /// Hash seed, defaults to the creation time
    pub seed: Option<u32>,
    /// Give up on lock acquisition after this many milliseconds
    pub lock_timeout_ms: Option<u64>,
}

/// A validated configuration with every default resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub buckets: usize,
    pub max_size: usize,
    pub max_entries: usize,
    pub ttl: u64,
    pub seed: Option<u32>,
    pub lock_timeout: Option<Duration>,
}

impl CacheConfig {
    /// Creates a config with the given bucket count and size bound.
    ///
    /// # Arguments
    /// * `buckets` - Number of hash buckets, 0 for the default
    /// * `max_size` - Aggregate size ceiling in bytes, 0 for unbounded
    pub fn new(buckets: usize, max_size: usize) -> Self {
        Self {
            buckets,
            max_size,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CACHE_BUCKETS` - Bucket count (default: 0, meaning 4096)
    /// - `LRU_CACHE_MAX_SIZE` - Aggregate size bound in bytes (default: 0, unbounded)
    /// - `LRU_CACHE_MAX_ENTRIES` - Entry limit (default: bucket count)
    /// - `LRU_CACHE_TTL` - TTL in seconds (default: 0, no expiry)
    /// - `LRU_CACHE_SEED` - Hash seed (default: creation time)
    /// - `LRU_CACHE_LOCK_TIMEOUT_MS` - Lock timeout (default: block forever)
    pub fn from_env() -> Self {
        Self {
            buckets: parse_var("LRU_CACHE_BUCKETS").unwrap_or(0),
            max_size: parse_var("LRU_CACHE_MAX_SIZE").unwrap_or(0),
            max_entries: parse_var("LRU_CACHE_MAX_ENTRIES"),
            ttl: parse_var("LRU_CACHE_TTL").unwrap_or(0),
            seed: parse_var("LRU_CACHE_SEED"),
            lock_timeout_ms: parse_var("LRU_CACHE_LOCK_TIMEOUT_MS"),
        }
    }

    // == Validate ==
    /// Checks the bounds and resolves defaults.
    pub fn validate(&self) -> Result<Limits> {
        let buckets = match self.buckets {
            0 => DEFAULT_BUCKETS,
            n if n < MIN_BUCKETS => {
                return Err(CacheError::InvalidArgument(format!(
                    "bucket count {} is below the minimum of {}",
                    n, MIN_BUCKETS
                )))
            }
            n => n,
        };

        if self.max_size != 0 && self.max_size < MIN_MAX_SIZE {
            return Err(CacheError::InvalidArgument(format!(
                "size bound {} is below the minimum of {}",
                self.max_size, MIN_MAX_SIZE
            )));
        }

        let max_entries = self.max_entries.unwrap_or(buckets);
        if max_entries == 0 {
            return Err(CacheError::InvalidArgument(
                "entry limit must be at least 1".to_string(),
            ));
        }

        Ok(Limits {
            buckets,
            max_size: self.max_size,
            max_entries,
            ttl: self.ttl,
            seed: self.seed,
            lock_timeout: self.lock_timeout_ms.map(Duration::from_millis),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
