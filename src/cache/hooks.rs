//! Capability hooks supplied by the embedding application.

use std::fmt;
use std::sync::Arc;

/// Reports the size in bytes of a value.
pub type SizeFn<V> = Arc<dyn Fn(&V) -> usize + Send + Sync>;

/// Releases a value the cache no longer holds.
pub type DestroyFn<V> = Arc<dyn Fn(V) + Send + Sync>;

/// Compares two values for equality.
pub type CompareFn<V> = Arc<dyn Fn(&V, &V) -> bool + Send + Sync>;

// == Hooks ==
/// The capability set installed on a cache.
pub struct Hooks<V> {
    pub size: Option<SizeFn<V>>,
    pub destroy: Option<DestroyFn<V>>,
    pub compare: Option<CompareFn<V>>,
}

impl<V> Default for Hooks<V> {
    fn default() -> Self {
        Self {
            size: None,
            destroy: None,
            compare: None,
        }
    }
}

impl<V> Clone for Hooks<V> {
    fn clone(&self) -> Self {
        Self {
            size: self.size.clone(),
            destroy: self.destroy.clone(),
            compare: self.compare.clone(),
        }
    }
}

impl<V> fmt::Debug for Hooks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("size", &self.size.is_some())
            .field("destroy", &self.destroy.is_some())
            .field("compare", &self.compare.is_some())
            .finish()
    }
}

// == Release ==
/// What happens to a value the cache lets go of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Release {
    /// Hand the value to the destroy hook
    #[default]
    Destroy,
    /// Give the value back to the caller untouched
    Keep,
}

// == Displaced ==
/// Values pushed out by a `set` under [`Release::Keep`].
///
/// Always empty under [`Release::Destroy`], where those values went to the
/// destroy hook instead.
#[derive(Debug)]
pub struct Displaced<V> {
    /// The previous value of the key, if it was replaced
    pub replaced: Option<V>,
    /// Entries evicted to make room, oldest first
    pub evicted: Vec<(String, V)>,
}

impl<V> Displaced<V> {
    pub fn is_empty(&self) -> bool {
        self.replaced.is_none() && self.evicted.is_empty()
    }
}

impl<V> Default for Displaced<V> {
    fn default() -> Self {
        Self {
            replaced: None,
            evicted: Vec::new(),
        }
    }
}
