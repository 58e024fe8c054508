//! LRU Order Module
//!
//! Implements the global recency order used for eviction.

use crate::cache::arena::Arena;

// == LRU List ==
/// Doubly-linked recency order threaded through the entries' `lru` links.
///
/// - Head = least recently written (next eviction candidate)
/// - Tail = most recently written
#[derive(Debug, Default, Clone, Copy)]
pub struct LruList {
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl LruList {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Back ==
    /// Appends an unlinked entry as most recently used.
    pub fn push_back<V>(&mut self, arena: &mut Arena<V>, idx: usize) {
        let prev = self.tail;
        if let Some(entry) = arena.get_mut(idx) {
            entry.lru.prev = prev;
            entry.lru.next = None;
        } else {
            return;
        }

        match prev {
            Some(tail) => {
                if let Some(tail) = arena.get_mut(tail) {
                    tail.lru.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
    }

    // == Unlink ==
    /// Removes an entry from wherever it sits in the order.
    pub fn unlink<V>(&mut self, arena: &mut Arena<V>, idx: usize) {
        let link = match arena.get_mut(idx) {
            Some(entry) => std::mem::take(&mut entry.lru),
            None => return,
        };

        match link.prev {
            Some(prev) => {
                if let Some(prev) = arena.get_mut(prev) {
                    prev.lru.next = link.next;
                }
            }
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => {
                if let Some(next) = arena.get_mut(next) {
                    next.lru.prev = link.prev;
                }
            }
            None => self.tail = link.prev,
        }
        self.len -= 1;
    }

    // == Promote ==
    /// Moves an entry to the most recently used position.
    pub fn promote<V>(&mut self, arena: &mut Arena<V>, idx: usize) {
        if self.tail == Some(idx) {
            return;
        }
        self.unlink(arena, idx);
        self.push_back(arena, idx);
    }

    /// Least recently used entry.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Most recently used entry.
    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Iterates indices from least to most recently used.
    pub fn iter<'a, V>(&self, arena: &'a Arena<V>) -> Iter<'a, V> {
        Iter {
            arena,
            cursor: self.head,
        }
    }
}

/// Iterator over the recency order, oldest first.
pub struct Iter<'a, V> {
    arena: &'a Arena<V>,
    cursor: Option<usize>,
}

impl<V> Iterator for Iter<'_, V> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let idx = self.cursor?;
        self.cursor = self.arena.get(idx).and_then(|e| e.lru.next);
        Some(idx)
    }
}
