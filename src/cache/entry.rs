//! Cache Entry Module
//!
//! Defines the record stored for each live key, with its chain and recency links.

// == Link ==
/// Previous/next arena indices within one intrusive list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Link {
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

// == Entry ==
/// A single cache entry.
///
/// Bucket-chain membership and global recency order use separate links, so an
/// entry can move in the recency order without touching its chain.
#[derive(Debug)]
pub struct Entry<V> {
    /// Owned copy of the key
    pub key: String,
    /// The stored value
    pub value: V,
    /// Unix seconds at insertion or last replacement
    pub created_at: i64,
    /// Invalidation stamp, compared against the cache epoch
    pub generation: u64,
    /// Bytes charged against the size bound
    pub charge: usize,
    /// Links within the bucket's collision chain
    pub chain: Link,
    /// Links within the global recency order
    pub lru: Link,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    ///
    /// # Arguments
    /// * `key` - Owned copy of the cache key
    /// * `value` - The value to store
    /// * `created_at` - Unix seconds used as the TTL start
    /// * `generation` - Invalidation stamp from the owning store
    /// * `charge` - Bytes this entry counts against the size bound
    pub fn new(key: String, value: V, created_at: i64, generation: u64, charge: usize) -> Self {
        Self {
            key,
            value,
            created_at,
            generation,
            charge,
            chain: Link::default(),
            lru: Link::default(),
        }
    }

    // == Is Visible ==
    /// Checks whether the entry can be returned by a lookup.
    ///
    /// An entry is invisible once the epoch has moved past its generation, or
    /// when a TTL is set and `now > created_at + ttl`.
    pub fn is_visible(&self, epoch: u64, ttl: u64, now: i64) -> bool {
        self.generation >= epoch && !self.is_expired(ttl, now)
    }

    /// Checks the TTL alone; a zero TTL never expires.
    pub fn is_expired(&self, ttl: u64, now: i64) -> bool {
        ttl != 0 && now > self.expires_at(ttl)
    }

    /// Seconds left before the entry expires, or None without a TTL.
    pub fn ttl_remaining(&self, ttl: u64, now: i64) -> Option<u64> {
        if ttl == 0 {
            return None;
        }
        Some(self.expires_at(ttl).saturating_sub(now).max(0) as u64)
    }

    /// Last second at which the entry is still visible. TTLs beyond `i64::MAX`
    /// clamp to it.
    fn expires_at(&self, ttl: u64) -> i64 {
        let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
        self.created_at.saturating_add(ttl)
    }
}

/// Bytes charged for an entry before the value itself is counted.
pub fn entry_overhead<V>() -> usize {
    std::mem::size_of::<Entry<V>>()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(created_at: i64, generation: u64) -> Entry<&'static str> {
        Entry::new("key".to_string(), "value", created_at, generation, 0)
    }

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = entry_at(100, 0);
        assert!(!entry.is_expired(0, i64::MAX));
        assert!(entry.is_visible(0, 0, 1_000_000));
        assert!(entry.ttl_remaining(0, 100).is_none());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = entry_at(100, 0);
        assert!(!entry.is_expired(10, 109));
        // Still visible at exactly created_at + ttl
        assert!(!entry.is_expired(10, 110));
        assert!(entry.is_visible(0, 10, 110));
        assert!(entry.is_expired(10, 111));
    }

    #[test]
    fn test_huge_ttl_does_not_wrap() {
        let entry = entry_at(1_700_000_000, 0);
        assert!(!entry.is_expired(u64::MAX, 1_700_000_000));
        assert!(!entry.is_expired(i64::MAX as u64 + 1, i64::MAX - 1));
        assert!(entry.is_visible(0, u64::MAX, 1_700_000_001));
        assert!(entry.ttl_remaining(u64::MAX, 1_700_000_000).unwrap() > 0);
    }

    #[test]
    fn test_epoch_hides_older_generations() {
        let entry = entry_at(100, 3);
        assert!(entry.is_visible(3, 0, 100));
        assert!(!entry.is_visible(4, 0, 100));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = entry_at(100, 0);
        assert_eq!(entry.ttl_remaining(10, 104), Some(6));
        assert_eq!(entry.ttl_remaining(10, 110), Some(0));
        assert_eq!(entry.ttl_remaining(10, 200), Some(0));
    }

    #[test]
    fn test_new_entry_is_unlinked() {
        let entry = entry_at(0, 0);
        assert_eq!(entry.chain, Link::default());
        assert_eq!(entry.lru, Link::default());
    }

    #[test]
    fn test_entry_overhead_counts_links() {
        assert!(entry_overhead::<u64>() >= std::mem::size_of::<Link>() * 2);
    }
}
