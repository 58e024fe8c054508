//! Entry arena
//!
//! Owns every entry in a slot vector addressed by stable indices. Freed slots
//! are recycled through a free list, so an index stays valid until its entry
//! is removed.

use crate::cache::entry::Entry;
use crate::error::Result;

#[derive(Debug)]
pub struct Arena<V> {
    slots: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    len: usize,
}

impl<V> Arena<V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `entry` and returns its index.
    ///
    /// Fails with `OutOfMemory` if the slot vector cannot grow; the arena is
    /// unchanged in that case.
    pub fn insert(&mut self, entry: Entry<V>) -> Result<usize> {
        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                self.slots.try_reserve(1)?;
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        self.slots[idx] = Some(entry);
        self.len += 1;
        Ok(idx)
    }

    /// Takes the entry out of its slot and recycles the slot.
    pub fn remove(&mut self, idx: usize) -> Option<Entry<V>> {
        let entry = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(entry)
    }

    pub fn get(&self, idx: usize) -> Option<&Entry<V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Entry<V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Reserves room for one more entry, so a following insert cannot fail.
    pub fn reserve_one(&mut self) -> Result<()> {
        if self.free.is_empty() {
            self.slots.try_reserve(1)?;
            self.free.try_reserve(1)?;
        }
        Ok(())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every entry, yielding them in slot order.
    pub fn drain(&mut self) -> impl Iterator<Item = Entry<V>> + '_ {
        self.free.clear();
        self.len = 0;
        self.slots.drain(..).flatten()
    }
}

impl<V> Default for Arena<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> Entry<u32> {
        Entry::new(key.to_string(), 0, 0, 0, 0)
    }

    #[test]
    fn test_arena_insert_and_get() {
        let mut arena = Arena::new();
        let a = arena.insert(entry("a")).unwrap();
        let b = arena.insert(entry("b")).unwrap();

        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a).unwrap().key, "a");
        assert_eq!(arena.get(b).unwrap().key, "b");
    }

    #[test]
    fn test_arena_recycles_slots() {
        let mut arena = Arena::new();
        let a = arena.insert(entry("a")).unwrap();
        arena.insert(entry("b")).unwrap();

        let removed = arena.remove(a).unwrap();
        assert_eq!(removed.key, "a");
        assert!(arena.get(a).is_none());

        let c = arena.insert(entry("c")).unwrap();
        assert_eq!(c, a);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_arena_remove_vacant_slot() {
        let mut arena: Arena<u32> = Arena::new();
        assert!(arena.remove(3).is_none());
        let a = arena.insert(entry("a")).unwrap();
        arena.remove(a);
        assert!(arena.remove(a).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_arena_drain() {
        let mut arena = Arena::new();
        arena.insert(entry("a")).unwrap();
        let b = arena.insert(entry("b")).unwrap();
        arena.insert(entry("c")).unwrap();
        arena.remove(b);

        let keys: Vec<String> = arena.drain().map(|e| e.key).collect();
        assert_eq!(keys, vec!["a".to_string(), "c".to_string()]);
        assert!(arena.is_empty());
    }
}
