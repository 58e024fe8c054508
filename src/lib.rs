//! LRU Cache Engine - an embeddable, thread-safe key-value cache
//!
//! Bounded by entry count and optionally by aggregate value size, with
//! least-recently-written eviction, per-cache TTL and O(1) invalidation.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheBuilder, CacheStats, Displaced, LruCache, Release};
pub use config::CacheConfig;
pub use error::{CacheError, Capability, Result};
