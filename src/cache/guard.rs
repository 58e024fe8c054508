//! Scoped locks held across several cache operations.
//!
//! A guard dereferences to the [`CacheStore`], so every operation called
//! through it runs under the lock it already holds. Dropping the guard
//! unlocks.

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::cache::store::CacheStore;

// == Read Guard ==
/// Shared access: lookups only, concurrent with other readers.
pub struct ReadGuard<'a, V> {
    inner: RwLockReadGuard<'a, CacheStore<V>>,
}

impl<'a, V> ReadGuard<'a, V> {
    pub(crate) fn new(inner: RwLockReadGuard<'a, CacheStore<V>>) -> Self {
        Self { inner }
    }

    /// Releases the lock.
    pub fn unlock(self) {}
}

impl<V> Deref for ReadGuard<'_, V> {
    type Target = CacheStore<V>;

    fn deref(&self) -> &CacheStore<V> {
        &self.inner
    }
}

// == Write Guard ==
/// Exclusive access: every operation, serialized against all other access.
pub struct WriteGuard<'a, V> {
    inner: RwLockWriteGuard<'a, CacheStore<V>>,
}

impl<'a, V> WriteGuard<'a, V> {
    pub(crate) fn new(inner: RwLockWriteGuard<'a, CacheStore<V>>) -> Self {
        Self { inner }
    }

    /// Trades exclusive access for shared access without letting a writer in.
    pub fn downgrade(self) -> ReadGuard<'a, V> {
        ReadGuard::new(RwLockWriteGuard::downgrade(self.inner))
    }

    /// Releases the lock.
    pub fn unlock(self) {}
}

impl<V> Deref for WriteGuard<'_, V> {
    type Target = CacheStore<V>;

    fn deref(&self) -> &CacheStore<V> {
        &self.inner
    }
}

impl<V> DerefMut for WriteGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut CacheStore<V> {
        &mut self.inner
    }
}
