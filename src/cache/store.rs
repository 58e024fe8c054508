//! Cache Store Module
//!
//! The cache engine: a bucket table for lookup, a global recency list for
//! eviction, and epoch/TTL stamps for invalidation. Nothing here locks;
//! `LruCache` and its guards decide when a `CacheStore` may be touched.

use std::mem;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::arena::Arena;
use crate::cache::clock::Clock;
use crate::cache::entry::{entry_overhead, Entry};
use crate::cache::hooks::{Displaced, Hooks, Release};
use crate::cache::lru::LruList;
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::cache::table::BucketTable;
use crate::config::Limits;
use crate::error::{CacheError, Capability, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eviction {
    Size,
    Count,
}

// == Cache Store ==
/// Main cache storage with LRU eviction, a size bound, TTL and epoch invalidation.
pub struct CacheStore<V> {
    /// Entry storage addressed by index
    arena: Arena<V>,
    /// Collision chains
    table: BucketTable,
    /// Recency order, oldest first
    lru: LruList,
    /// Aggregate size ceiling, 0 = unbounded
    max_size: usize,
    /// Entry limit
    max_entries: usize,
    /// Time-to-live in seconds, 0 = none
    ttl: u64,
    /// Running sum of entry charges
    size_total: usize,
    /// Entries stamped below this generation are invisible
    epoch: u64,
    /// Stamp handed to the next inserted or replaced entry
    next_generation: u64,
    hooks: Hooks<V>,
    clock: Arc<dyn Clock>,
    stats: StatsCounters,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store from validated limits.
    pub(crate) fn new(limits: &Limits, hooks: Hooks<V>, clock: Arc<dyn Clock>) -> Result<Self> {
        let seed = limits.seed.unwrap_or(clock.now() as u32);
        let table = BucketTable::new(limits.buckets, seed)?;

        Ok(Self {
            arena: Arena::new(),
            table,
            lru: LruList::new(),
            max_size: limits.max_size,
            max_entries: limits.max_entries,
            ttl: limits.ttl,
            size_total: 0,
            epoch: 0,
            next_generation: 0,
            hooks,
            clock,
            stats: StatsCounters::default(),
        })
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None when the key is absent, expired, or older than the last
    /// `empty`. Does not change recency.
    pub fn get(&self, key: &str) -> Option<&V> {
        let entry = self
            .table
            .find(&self.arena, key)
            .and_then(|idx| self.arena.get(idx))
            .filter(|entry| self.is_visible(entry));

        match entry {
            Some(entry) => {
                self.stats.record_hit();
                Some(&entry.value)
            }
            None => {
                trace!(key, "cache miss");
                self.stats.record_miss();
                None
            }
        }
    }

    /// Checks whether `key` would be returned by `get`, without touching stats.
    pub fn contains(&self, key: &str) -> bool {
        self.table
            .find(&self.arena, key)
            .and_then(|idx| self.arena.get(idx))
            .map_or(false, |entry| self.is_visible(entry))
    }

    // == Set ==
    /// Stores a value, releasing anything it displaces through the destroy hook.
    pub fn set(&mut self, key: &str, value: V) -> Result<Displaced<V>> {
        self.set_with(key, value, Release::Destroy)
    }

    /// Stores a value under `key`.
    ///
    /// An existing key has its value replaced, its timer restarted and is
    /// promoted to most recently used. Before committing, entries are evicted
    /// from the least recently used end until the size bound and the entry
    /// limit both hold. If anything fails, the cache is left unchanged.
    ///
    /// # Arguments
    /// * `key` - The cache key, copied into the entry on first insert
    /// * `value` - The value to store
    /// * `release` - Whether displaced values go to the destroy hook or back to the caller
    pub fn set_with(&mut self, key: &str, value: V, release: Release) -> Result<Displaced<V>> {
        let existing = self.table.find(&self.arena, key);
        let charge = self.charge_for(key, &value)?;

        if self.max_size != 0 && charge > self.max_size {
            return Err(CacheError::EntryTooLarge {
                key: key.to_string(),
                charge,
                max_size: self.max_size,
            });
        }

        let growth = match existing.and_then(|idx| self.arena.get(idx)) {
            Some(entry) => charge.saturating_sub(entry.charge),
            None => charge,
        };
        let victims = self.plan_evictions(existing, growth);

        if existing.is_some() || !victims.is_empty() {
            self.require_destroy(release)?;
        }

        let owned_key = match existing {
            Some(_) => None,
            None => {
                let mut owned = String::new();
                owned.try_reserve_exact(key.len())?;
                owned.push_str(key);
                self.arena.reserve_one()?;
                Some(owned)
            }
        };

        let mut displaced = Displaced::default();
        for (idx, reason) in victims {
            if let Some(entry) = self.detach(idx) {
                match reason {
                    Eviction::Size => self.stats.record_size_eviction(),
                    Eviction::Count => self.stats.record_count_eviction(),
                }
                debug!(key = %entry.key, ?reason, "evicted entry");
                if let Some(value) = self.release(entry.value, release) {
                    displaced.evicted.push((entry.key, value));
                }
            }
        }

        let now = self.clock.now();
        let generation = self.stamp();

        match (existing, owned_key) {
            (Some(idx), _) => {
                let old = match self.arena.get_mut(idx) {
                    Some(entry) => {
                        self.size_total = self.size_total - entry.charge + charge;
                        entry.charge = charge;
                        entry.created_at = now;
                        entry.generation = generation;
                        mem::replace(&mut entry.value, value)
                    }
                    None => return Ok(displaced),
                };
                self.lru.promote(&mut self.arena, idx);
                self.stats.record_replacement();
                displaced.replaced = self.release(old, release);
            }
            (None, Some(owned)) => {
                let idx = self
                    .arena
                    .insert(Entry::new(owned, value, now, generation, charge))?;
                self.table.link(&mut self.arena, idx);
                self.lru.push_back(&mut self.arena, idx);
                self.size_total += charge;
                self.stats.record_insertion();
            }
            (None, None) => {}
        }

        trace!(key, charge, size_total = self.size_total, "stored entry");
        Ok(displaced)
    }

    // == Unset ==
    /// Removes an entry, releasing its value through the destroy hook.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        self.unset_with(key, Release::Destroy).map(|_| ())
    }

    /// Removes an entry whether or not it is still visible.
    ///
    /// Returns the value under [`Release::Keep`], None otherwise.
    ///
    /// # Arguments
    /// * `key` - The key to remove
    /// * `release` - Whether the value goes to the destroy hook or back to the caller
    pub fn unset_with(&mut self, key: &str, release: Release) -> Result<Option<V>> {
        let idx = self
            .table
            .find(&self.arena, key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        self.require_destroy(release)?;

        match self.detach(idx) {
            Some(entry) => {
                self.stats.record_removal();
                Ok(self.release(entry.value, release))
            }
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    // == Empty ==
    /// Invalidates every current entry in O(1).
    ///
    /// Entries stay in storage until a later operation reclaims them.
    pub fn empty(&mut self) {
        self.epoch = self.next_generation;
        debug!(epoch = self.epoch, entries = self.arena.len(), "invalidated cache");
    }

    // == Purge Expired ==
    /// Physically removes every entry `get` can no longer see.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> Result<usize> {
        self.purge(Release::Destroy).map(|(removed, _)| removed)
    }

    /// Removes invisible entries, returning them under [`Release::Keep`].
    pub fn purge_expired_with(&mut self, release: Release) -> Result<Vec<(String, V)>> {
        self.purge(release).map(|(_, kept)| kept)
    }

    /// Detaches every invisible entry. Returns how many were removed along with
    /// the values kept for the caller.
    fn purge(&mut self, release: Release) -> Result<(usize, Vec<(String, V)>)> {
        let stale: Vec<usize> = self
            .lru
            .iter(&self.arena)
            .filter(|&idx| self.arena.get(idx).map_or(false, |e| !self.is_visible(e)))
            .collect();
        if stale.is_empty() {
            return Ok((0, Vec::new()));
        }
        self.require_destroy(release)?;

        let mut removed = 0;
        let mut kept = Vec::new();
        for idx in stale {
            if let Some(entry) = self.detach(idx) {
                removed += 1;
                if let Some(value) = self.release(entry.value, release) {
                    kept.push((entry.key, value));
                }
            }
        }

        self.stats.record_purged(removed as u64);
        debug!(purged = removed, "purged invisible entries");
        Ok((removed, kept))
    }

    /// Removes every entry, as cache destruction does.
    pub(crate) fn drain_with(&mut self, release: Release) -> Result<Vec<(String, V)>> {
        if !self.arena.is_empty() {
            self.require_destroy(release)?;
        }

        let destroy = self.hooks.destroy.clone();
        let mut kept = Vec::new();
        for entry in self.arena.drain() {
            match (release, &destroy) {
                (Release::Keep, _) => kept.push((entry.key, entry.value)),
                (Release::Destroy, Some(destroy)) => destroy(entry.value),
                (Release::Destroy, None) => drop(entry.value),
            }
        }
        self.table.clear();
        self.lru.clear();
        self.size_total = 0;
        Ok(kept)
    }

    // == Configuration ==
    /// Installs the sizing hook.
    pub fn set_size_hook<F>(&mut self, size: F)
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        self.hooks.size = Some(Arc::new(size));
    }

    /// Installs the destroy hook.
    pub fn set_destroy_hook<F>(&mut self, destroy: F)
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        self.hooks.destroy = Some(Arc::new(destroy));
    }

    /// Installs the comparison hook. No cache operation calls it.
    pub fn set_compare_hook<F>(&mut self, compare: F)
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        self.hooks.compare = Some(Arc::new(compare));
    }

    /// Replaces the whole capability set.
    pub fn set_hooks(&mut self, hooks: Hooks<V>) {
        self.hooks = hooks;
    }

    /// Sets the time-to-live for every entry, 0 to disable expiry.
    pub fn set_ttl(&mut self, ttl: u64) {
        self.ttl = ttl;
    }

    /// Compares two values with the configured hook, if there is one.
    pub fn compare(&self, a: &V, b: &V) -> Option<bool> {
        self.hooks.compare.as_ref().map(|compare| compare(a, b))
    }

    // == Accessors ==
    /// Number of stored entries, including ones `get` no longer sees.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn size_total(&self) -> usize {
        self.size_total
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    pub fn seed(&self) -> u32 {
        self.table.seed()
    }

    pub fn hooks(&self) -> &Hooks<V> {
        &self.hooks
    }

    /// Seconds left for a visible key, or None without a TTL or when absent.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        let entry = self
            .table
            .find(&self.arena, key)
            .and_then(|idx| self.arena.get(idx))
            .filter(|entry| self.is_visible(entry))?;
        entry.ttl_remaining(self.ttl, self.clock.now())
    }

    /// Key that would be evicted next.
    pub fn least_recent_key(&self) -> Option<&str> {
        self.lru
            .head()
            .and_then(|idx| self.arena.get(idx))
            .map(|entry| entry.key.as_str())
    }

    /// Key most recently inserted or replaced.
    pub fn most_recent_key(&self) -> Option<&str> {
        self.lru
            .tail()
            .and_then(|idx| self.arena.get(idx))
            .map(|entry| entry.key.as_str())
    }

    /// Stored keys from least to most recently written.
    pub fn keys_lru(&self) -> impl Iterator<Item = &str> + '_ {
        self.lru
            .iter(&self.arena)
            .filter_map(|idx| self.arena.get(idx))
            .map(|entry| entry.key.as_str())
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.arena.len(), self.size_total)
    }

    // == Internals ==
    fn is_visible(&self, entry: &Entry<V>) -> bool {
        entry.is_visible(self.epoch, self.ttl, self.clock.now())
    }

    fn stamp(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// Bytes an entry for `key` holding `value` counts against the bound.
    ///
    /// A charge that does not fit in `usize`, or that would overflow the running
    /// total, is rejected as too large.
    fn charge_for(&self, key: &str, value: &V) -> Result<usize> {
        let size = match (&self.hooks.size, self.max_size) {
            (Some(size), _) => size,
            (None, 0) => return Ok(0),
            (None, _) => return Err(CacheError::MissingCapability(Capability::Size)),
        };

        entry_overhead::<V>()
            .checked_add(key.len())
            .and_then(|charge| charge.checked_add(size(value)))
            .filter(|charge| self.size_total.checked_add(*charge).is_some())
            .ok_or_else(|| CacheError::EntryTooLarge {
                key: key.to_string(),
                charge: usize::MAX,
                max_size: self.max_size,
            })
    }

    fn require_destroy(&self, release: Release) -> Result<()> {
        if release == Release::Destroy && self.hooks.destroy.is_none() {
            return Err(CacheError::MissingCapability(Capability::Destroy));
        }
        Ok(())
    }

    /// Picks victims from the least recently used end.
    ///
    /// The size phase runs first and skips `existing`; the count phase only
    /// applies when a new key is being added.
    fn plan_evictions(&self, existing: Option<usize>, growth: usize) -> Vec<(usize, Eviction)> {
        let mut victims = Vec::new();
        let mut order = self.lru.iter(&self.arena);
        let mut projected = self.size_total;
        let mut count = self.arena.len();

        if self.max_size != 0 {
            while projected + growth > self.max_size {
                let Some(idx) = order.next() else { break };
                if Some(idx) == existing {
                    continue;
                }
                if let Some(entry) = self.arena.get(idx) {
                    projected -= entry.charge;
                    count -= 1;
                    victims.push((idx, Eviction::Size));
                }
            }
        }

        if existing.is_none() {
            while count >= self.max_entries {
                let Some(idx) = order.next() else { break };
                count -= 1;
                victims.push((idx, Eviction::Count));
            }
        }

        victims
    }

    /// Splices an entry out of its chain and the recency order.
    fn detach(&mut self, idx: usize) -> Option<Entry<V>> {
        self.table.unlink(&mut self.arena, idx);
        self.lru.unlink(&mut self.arena, idx);
        let entry = self.arena.remove(idx)?;
        self.size_total -= entry.charge;
        Some(entry)
    }

    /// Hands a value to the destroy hook, or back to the caller under `Keep`.
    fn release(&self, value: V, release: Release) -> Option<V> {
        match (release, &self.hooks.destroy) {
            (Release::Keep, _) => Some(value),
            (Release::Destroy, Some(destroy)) => {
                destroy(value);
                None
            }
            (Release::Destroy, None) => None,
        }
    }

    /// Checks the structural invariants. Test helper.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let chained: usize = (0..self.table.bucket_count())
            .map(|bucket| self.table.chain_len(&self.arena, bucket))
            .sum();
        assert_eq!(chained, self.arena.len(), "chain lengths != entry count");
        assert_eq!(self.lru.len(), self.arena.len(), "lru length != entry count");
        assert_eq!(
            self.lru.iter(&self.arena).count(),
            self.arena.len(),
            "lru walk != entry count"
        );

        let charged: usize = self
            .lru
            .iter(&self.arena)
            .filter_map(|idx| self.arena.get(idx))
            .map(|entry| entry.charge)
            .sum();
        assert_eq!(charged, self.size_total, "size_total drifted");

        if self.max_size != 0 {
            assert!(self.size_total <= self.max_size, "size bound exceeded");
        }
        assert!(self.arena.len() <= self.max_entries, "entry limit exceeded");

        for key in self.keys_lru() {
            assert!(self.table.find(&self.arena, key).is_some());
        }
    }
}

impl<V> Drop for CacheStore<V> {
    fn drop(&mut self) {
        let destroy = self.hooks.destroy.clone();
        for entry in self.arena.drain() {
            if let Some(destroy) = &destroy {
                destroy(entry.value);
            }
        }
    }
}
