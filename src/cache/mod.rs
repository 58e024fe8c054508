//! Cache Module
//!
//! Fixed-capacity string-keyed cache with LRU eviction, an optional aggregate
//! size bound, TTL expiration and O(1) bulk invalidation.

mod arena;
mod builder;
mod clock;
mod concurrent;
mod entry;
mod guard;
mod hash;
mod hooks;
mod lru;
mod stats;
mod store;
mod table;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use builder::CacheBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use concurrent::{LruCache, ValueRef};
pub use guard::{ReadGuard, WriteGuard};
pub use hooks::{CompareFn, DestroyFn, Displaced, Hooks, Release, SizeFn};
pub use stats::CacheStats;
pub use store::CacheStore;
