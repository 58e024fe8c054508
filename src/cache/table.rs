//! Bucket Table Module
//!
//! Fixed array of collision chains. Each bucket holds the arena index of the
//! first entry in its chain; the rest of the chain is threaded through the
//! entries' `chain` links.

use crate::cache::arena::Arena;
use crate::cache::hash::KeyHasher;
use crate::error::Result;

#[derive(Debug)]
pub struct BucketTable {
    heads: Vec<Option<usize>>,
    hasher: KeyHasher,
}

impl BucketTable {
    /// Allocates `buckets` empty chains.
    pub fn new(buckets: usize, seed: u32) -> Result<Self> {
        let mut heads = Vec::new();
        heads.try_reserve_exact(buckets)?;
        heads.resize(buckets, None);
        Ok(Self {
            heads,
            hasher: KeyHasher::new(seed, buckets),
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    pub fn seed(&self) -> u32 {
        self.hasher.seed()
    }

    // == Find ==
    /// Walks the key's chain and returns the index of the matching entry.
    pub fn find<V>(&self, arena: &Arena<V>, key: &str) -> Option<usize> {
        let mut cursor = self.heads[self.hasher.bucket(key)];
        while let Some(idx) = cursor {
            let entry = arena.get(idx)?;
            if entry.key == key {
                return Some(idx);
            }
            cursor = entry.chain.next;
        }
        None
    }

    // == Link ==
    /// Appends the entry at `idx` to the end of its key's chain.
    pub fn link<V>(&mut self, arena: &mut Arena<V>, idx: usize) {
        let bucket = match arena.get(idx) {
            Some(entry) => self.hasher.bucket(&entry.key),
            None => return,
        };

        let mut last = None;
        let mut cursor = self.heads[bucket];
        while let Some(cur) = cursor {
            last = Some(cur);
            cursor = arena.get(cur).and_then(|e| e.chain.next);
        }

        if let Some(entry) = arena.get_mut(idx) {
            entry.chain.prev = last;
            entry.chain.next = None;
        }
        match last {
            Some(tail) => {
                if let Some(tail) = arena.get_mut(tail) {
                    tail.chain.next = Some(idx);
                }
            }
            None => self.heads[bucket] = Some(idx),
        }
    }

    // == Unlink ==
    /// Splices the entry at `idx` out of its chain using its own links.
    pub fn unlink<V>(&mut self, arena: &mut Arena<V>, idx: usize) {
        let (bucket, link) = match arena.get(idx) {
            Some(entry) => (self.hasher.bucket(&entry.key), entry.chain),
            None => return,
        };

        match link.prev {
            Some(prev) => {
                if let Some(prev) = arena.get_mut(prev) {
                    prev.chain.next = link.next;
                }
            }
            None => self.heads[bucket] = link.next,
        }
        if let Some(next) = link.next {
            if let Some(next) = arena.get_mut(next) {
                next.chain.prev = link.prev;
            }
        }
        if let Some(entry) = arena.get_mut(idx) {
            entry.chain = Default::default();
        }
    }

    /// Forgets every chain. Entries must be drained from the arena separately.
    pub fn clear(&mut self) {
        self.heads.iter_mut().for_each(|head| *head = None);
    }

    /// Number of entries in bucket `bucket`'s chain.
    #[cfg(test)]
    pub fn chain_len<V>(&self, arena: &Arena<V>, bucket: usize) -> usize {
        let mut len = 0;
        let mut cursor = self.heads[bucket];
        while let Some(idx) = cursor {
            len += 1;
            cursor = arena.get(idx).and_then(|e| e.chain.next);
        }
        len
    }
}
