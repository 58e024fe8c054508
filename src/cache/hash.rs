//! Key Hashing Module
//!
//! Seeded bucket hashing on top of `ahash`.

use ahash::RandomState;

// Fixed lanes so a given seed always produces the same bucket layout.
const K1: u64 = 0x243f_6a88_85a3_08d3;
const K2: u64 = 0x1319_8a2e_0370_7344;
const K3: u64 = 0xa409_3822_299f_31d0;

// == Key Hasher ==
/// Maps keys to bucket indices for one cache instance.
#[derive(Debug, Clone)]
pub struct KeyHasher {
    state: RandomState,
    seed: u32,
    buckets: usize,
}

impl KeyHasher {
    /// Creates a hasher reducing into `buckets` slots.
    ///
    /// # Arguments
    /// * `seed` - Per-cache seed, fixed for the cache's lifetime
    /// * `buckets` - Number of slots, must be nonzero
    pub fn new(seed: u32, buckets: usize) -> Self {
        debug_assert!(buckets > 0);
        Self {
            state: RandomState::with_seeds(u64::from(seed), K1, K2, K3),
            seed,
            buckets,
        }
    }

    /// Returns the bucket index for `key`.
    pub fn bucket(&self, key: &str) -> usize {
        let digest = self.state.hash_one(key) as u32;
        let index = digest as usize % self.buckets;
        tracing::trace!(key, digest, index, "hashed key");
        index
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}
