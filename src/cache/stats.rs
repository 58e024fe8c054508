//! Cache Statistics Module
//!
//! Tracks hits, misses, insertions and evictions. Counters are atomic so that
//! lookups under a shared read lock can record them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Counters ==
/// Live counters owned by a cache.
#[derive(Debug, Default)]
pub struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    replacements: AtomicU64,
    removals: AtomicU64,
    size_evictions: AtomicU64,
    count_evictions: AtomicU64,
    purged: AtomicU64,
}

impl StatsCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insertion(&self) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replacement(&self) {
        self.replacements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_size_eviction(&self) {
        self.size_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_count_eviction(&self) {
        self.count_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_purged(&self, count: u64) {
        self.purged.fetch_add(count, Ordering::Relaxed);
    }

    /// Copies the counters together with the current occupancy.
    pub fn snapshot(&self, entries: usize, size_total: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            replacements: self.replacements.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            size_evictions: self.size_evictions.load(Ordering::Relaxed),
            count_evictions: self.count_evictions.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
            entries,
            size_total,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a visible value
    pub hits: u64,
    /// Lookups for absent, expired or invalidated keys
    pub misses: u64,
    /// New keys stored
    pub insertions: u64,
    /// Existing keys overwritten
    pub replacements: u64,
    /// Explicit unsets
    pub removals: u64,
    /// Entries evicted to honour the size bound
    pub size_evictions: u64,
    /// Entries evicted to honour the entry limit
    pub count_evictions: u64,
    /// Invisible entries reclaimed by a purge
    pub purged: u64,
    /// Live entries, visible or not
    pub entries: usize,
    /// Bytes charged against the size bound
    pub size_total: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Evictions for either reason.
    pub fn evictions(&self) -> u64 {
        self.size_evictions + self.count_evictions
    }
}
