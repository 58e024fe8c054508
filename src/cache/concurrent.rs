//! Thread-safe cache handle.
//!
//! One readers-writer lock guards the whole [`CacheStore`]. Lookups take it
//! shared; everything else takes it exclusive. Locks are only taken here, at
//! the public entry points.

use std::time::Duration;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::cache::builder::CacheBuilder;
use crate::cache::guard::{ReadGuard, WriteGuard};
use crate::cache::hooks::{Displaced, Release};
use crate::cache::stats::CacheStats;
use crate::cache::store::CacheStore;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// A value borrowed from the cache. Holds the read lock until dropped.
pub type ValueRef<'a, V> = MappedRwLockReadGuard<'a, V>;

// == LRU Cache ==
/// Fixed-capacity, thread-safe LRU cache keyed by strings.
pub struct LruCache<V> {
    store: RwLock<CacheStore<V>>,
    lock_timeout: Option<Duration>,
}

impl<V> LruCache<V> {
    /// Creates a cache with no hooks and the system clock.
    ///
    /// # Arguments
    /// * `config` - Bucket count, bounds, TTL and seed; validated before use
    pub fn new(config: CacheConfig) -> Result<Self> {
        CacheBuilder::new().config(config).build()
    }

    pub fn builder() -> CacheBuilder<V> {
        CacheBuilder::new()
    }

    pub(crate) fn from_store(store: CacheStore<V>, lock_timeout: Option<Duration>) -> Self {
        Self {
            store: RwLock::new(store),
            lock_timeout,
        }
    }

    // == Explicit Locking ==
    /// Takes the shared lock for a sequence of lookups.
    pub fn read(&self) -> Result<ReadGuard<'_, V>> {
        self.read_lock().map(ReadGuard::new)
    }

    /// Takes the exclusive lock for a sequence of operations.
    pub fn write(&self) -> Result<WriteGuard<'_, V>> {
        self.write_lock().map(WriteGuard::new)
    }

    // == Get ==
    /// Looks up a visible value.
    ///
    /// The returned reference keeps the read lock held, so the value cannot be
    /// evicted or overwritten while it is borrowed. Writers block until it is
    /// dropped.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    pub fn get(&self, key: &str) -> Result<Option<ValueRef<'_, V>>> {
        let guard = self.read_lock()?;
        Ok(RwLockReadGuard::try_map(guard, |store| store.get(key)).ok())
    }

    /// Looks up a visible value and copies it out, releasing the lock.
    pub fn get_cloned(&self, key: &str) -> Result<Option<V>>
    where
        V: Clone,
    {
        Ok(self.read_lock()?.get(key).cloned())
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read_lock()?.contains(key))
    }

    // == Mutations ==
    /// Inserts or replaces a value, releasing displaced values through the destroy hook.
    pub fn set(&self, key: &str, value: V) -> Result<Displaced<V>> {
        self.write_lock()?.set(key, value)
    }

    /// Inserts or replaces a value.
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `value` - The value to store
    /// * `release` - [`Release::Keep`] hands replaced and evicted values back
    ///   in the returned [`Displaced`] instead of the destroy hook
    pub fn set_with(&self, key: &str, value: V, release: Release) -> Result<Displaced<V>> {
        self.write_lock()?.set_with(key, value, release)
    }

    /// Removes one entry.
    pub fn unset(&self, key: &str) -> Result<()> {
        self.write_lock()?.unset(key)
    }

    /// Removes one entry, visible or not.
    ///
    /// # Arguments
    /// * `key` - The key to remove
    /// * `release` - [`Release::Keep`] returns the value instead of destroying it
    ///
    /// Fails with `NotFound` when the key is not stored.
    pub fn unset_with(&self, key: &str, release: Release) -> Result<Option<V>> {
        self.write_lock()?.unset_with(key, release)
    }

    /// Invalidates every current entry in O(1).
    pub fn empty(&self) -> Result<()> {
        self.write_lock()?.empty();
        Ok(())
    }

    /// Reclaims entries that are no longer visible.
    pub fn purge_expired(&self) -> Result<usize> {
        self.write_lock()?.purge_expired()
    }

    // == Configuration ==
    pub fn set_size_hook<F>(&self, size: F) -> Result<()>
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        self.write_lock()?.set_size_hook(size);
        Ok(())
    }

    pub fn set_destroy_hook<F>(&self, destroy: F) -> Result<()>
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        self.write_lock()?.set_destroy_hook(destroy);
        Ok(())
    }

    pub fn set_compare_hook<F>(&self, compare: F) -> Result<()>
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        self.write_lock()?.set_compare_hook(compare);
        Ok(())
    }

    pub fn set_ttl(&self, ttl: u64) -> Result<()> {
        self.write_lock()?.set_ttl(ttl);
        Ok(())
    }

    // == Accessors ==
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_lock()?.is_empty())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        Ok(self.read_lock()?.stats())
    }

    // == Destroy ==
    /// Tears the cache down, releasing every value.
    ///
    /// Under [`Release::Keep`] the remaining entries are returned instead.
    /// Under [`Release::Destroy`] a non-empty cache needs a destroy hook.
    pub fn destroy(self, release: Release) -> Result<Vec<(String, V)>> {
        let mut store = self.store.into_inner();
        let entries = store.len();
        let kept = store.drain_with(release)?;
        info!(entries, "destroyed cache");
        Ok(kept)
    }

    // == Lock Acquisition ==
    fn read_lock(&self) -> Result<RwLockReadGuard<'_, CacheStore<V>>> {
        match self.lock_timeout {
            None => Ok(self.store.read()),
            Some(timeout) => self.store.try_read_for(timeout).ok_or_else(|| {
                CacheError::LockFailure(format!("read lock not acquired within {:?}", timeout))
            }),
        }
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, CacheStore<V>>> {
        match self.lock_timeout {
            None => Ok(self.store.write()),
            Some(timeout) => self.store.try_write_for(timeout).ok_or_else(|| {
                CacheError::LockFailure(format!("write lock not acquired within {:?}", timeout))
            }),
        }
    }
}
