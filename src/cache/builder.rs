//! Builder that wires configuration, capability hooks and a clock into a cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::concurrent::LruCache;
use crate::cache::hooks::Hooks;
use crate::cache::store::CacheStore;
use crate::config::CacheConfig;
use crate::error::Result;

/// Collects everything a cache needs at construction.
///
/// ```
/// use lru_cache_engine::LruCache;
///
/// let cache: LruCache<String> = LruCache::builder()
///     .max_entries(2)
///     .destroy_hook(drop)
///     .build()
///     .unwrap();
///
/// cache.set("a", "1".to_string()).unwrap();
/// cache.set("b", "2".to_string()).unwrap();
/// cache.set("c", "3".to_string()).unwrap();
/// assert!(cache.get("a").unwrap().is_none());
/// ```
pub struct CacheBuilder<V> {
    config: CacheConfig,
    hooks: Hooks<V>,
    clock: Arc<dyn Clock>,
}

impl<V> CacheBuilder<V> {
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            hooks: Hooks::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bucket count.
    ///
    /// # Arguments
    /// * `buckets` - Number of hash buckets; 0 picks the default, fewer than 128 is rejected
    pub fn buckets(mut self, buckets: usize) -> Self {
        self.config.buckets = buckets;
        self
    }

    /// Bounds the aggregate charged size.
    ///
    /// # Arguments
    /// * `max_size` - Ceiling in bytes, 0 for unbounded; nonzero values below 1 MiB are rejected
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config.max_size = max_size;
        self
    }

    /// # Arguments
    /// * `max_entries` - Entry limit, defaults to the bucket count
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Sets the time-to-live.
    ///
    /// # Arguments
    /// * `ttl` - Seconds an entry stays visible after it is written, 0 for no expiry
    pub fn ttl(mut self, ttl: u64) -> Self {
        self.config.ttl = ttl;
        self
    }

    /// Fixes the hash seed instead of deriving it from the clock.
    pub fn seed(mut self, seed: u32) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// # Arguments
    /// * `timeout` - How long an operation waits for the lock before failing with `LockFailure`
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Installs the sizing hook. Required when `max_size` is set.
    ///
    /// # Arguments
    /// * `size` - Reports the bytes a value occupies
    pub fn size_hook<F>(mut self, size: F) -> Self
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        self.hooks.size = Some(Arc::new(size));
        self
    }

    /// Installs the destroy hook.
    ///
    /// # Arguments
    /// * `destroy` - Receives every value the cache releases under [`Release::Destroy`]
    ///
    /// [`Release::Destroy`]: crate::cache::Release::Destroy
    pub fn destroy_hook<F>(mut self, destroy: F) -> Self
    where
        F: Fn(V) + Send + Sync + 'static,
    {
        self.hooks.destroy = Some(Arc::new(destroy));
        self
    }

    /// Installs the comparison hook. Stored, never called by the cache itself.
    pub fn compare_hook<F>(mut self, compare: F) -> Self
    where
        F: Fn(&V, &V) -> bool + Send + Sync + 'static,
    {
        self.hooks.compare = Some(Arc::new(compare));
        self
    }

    pub fn hooks(mut self, hooks: Hooks<V>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Time source for TTL checks, the system clock by default.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Build ==
    /// Validates the configuration and allocates the bucket table.
    pub fn build(self) -> Result<LruCache<V>> {
        let limits = self.config.validate()?;
        let store = CacheStore::new(&limits, self.hooks, self.clock)?;

        info!(
            buckets = limits.buckets,
            max_entries = limits.max_entries,
            max_size = limits.max_size,
            ttl = limits.ttl,
            "created cache"
        );
        Ok(LruCache::from_store(store, limits.lock_timeout))
    }
}

impl<V> Default for CacheBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BUCKETS;
    use crate::error::CacheError;

    #[test]
    fn test_builder_defaults() {
        let cache: LruCache<u32> = CacheBuilder::new().build().unwrap();
        let guard = cache.read().unwrap();
        assert_eq!(guard.bucket_count(), 4096);
        assert_eq!(guard.max_entries(), 4096);
        assert_eq!(guard.max_size(), 0);
        assert_eq!(guard.ttl(), 0);
    }

    #[test]
    fn test_builder_applies_settings() {
        let cache: LruCache<u32> = CacheBuilder::new()
            .buckets(MIN_BUCKETS)
            .max_entries(16)
            .max_size(2 * 1024 * 1024)
            .ttl(30)
            .seed(11)
            .size_hook(|_| 4)
            .build()
            .unwrap();

        let guard = cache.read().unwrap();
        assert_eq!(guard.bucket_count(), MIN_BUCKETS);
        assert_eq!(guard.max_entries(), 16);
        assert_eq!(guard.max_size(), 2 * 1024 * 1024);
        assert_eq!(guard.ttl(), 30);
        assert_eq!(guard.seed(), 11);
        assert!(guard.hooks().size.is_some());
    }

    #[test]
    fn test_builder_rejects_invalid_buckets() {
        let result: Result<LruCache<u32>> = CacheBuilder::new().buckets(2).build();
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[test]
    fn test_builder_rejects_small_size_bound() {
        let result: Result<LruCache<u32>> = CacheBuilder::new().max_size(10).build();
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }
}
