//! Property-Based Tests for Cache Module
//!
//! Drives a `CacheStore` and a simple queue-based model with the same random
//! operations and checks that they agree.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::cache::clock::ManualClock;
use crate::cache::hooks::{Hooks, Release};
use crate::cache::store::CacheStore;
use crate::config::{CacheConfig, MIN_MAX_SIZE};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 8;

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-l]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Unset { key: String },
    Empty,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Unset { key }),
        1 => Just(CacheOp::Empty),
    ]
}

fn sized_set_strategy() -> impl Strategy<Value = (String, usize)> {
    (key_strategy(), 1usize..400_000)
}

// == Model ==
/// Reference model: front of the queue is the least recently written key.
#[derive(Default)]
struct Model {
    order: VecDeque<String>,
    values: HashMap<String, String>,
    invalidated: HashSet<String>,
}

impl Model {
    fn set(&mut self, key: &str, value: &str) {
        if self.values.contains_key(key) {
            self.order.retain(|k| k != key);
        } else if self.order.len() >= TEST_MAX_ENTRIES {
            if let Some(oldest) = self.order.pop_front() {
                self.values.remove(&oldest);
                self.invalidated.remove(&oldest);
            }
        }
        self.order.push_back(key.to_string());
        self.values.insert(key.to_string(), value.to_string());
        self.invalidated.remove(key);
    }

    fn get(&self, key: &str) -> Option<&String> {
        if self.invalidated.contains(key) {
            return None;
        }
        self.values.get(key)
    }

    fn unset(&mut self, key: &str) -> bool {
        if self.values.remove(key).is_none() {
            return false;
        }
        self.order.retain(|k| k != key);
        self.invalidated.remove(key);
        true
    }

    fn empty(&mut self) {
        self.invalidated = self.values.keys().cloned().collect();
    }
}

fn new_store(max_entries: usize, max_size: usize) -> CacheStore<String> {
    let config = CacheConfig {
        max_entries: Some(max_entries),
        max_size,
        seed: Some(17),
        ..CacheConfig::default()
    };
    let limits = config.validate().unwrap();
    let mut store =
        CacheStore::new(&limits, Hooks::default(), Arc::new(ManualClock::new(0))).unwrap();
    store.set_destroy_hook(drop);
    store.set_size_hook(|v: &String| v.len());
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of operations, the store agrees with the model on every
    // lookup, on NotFound results and on the recency order.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..120)) {
        let mut store = new_store(TEST_MAX_ENTRIES, 0);
        let mut model = Model::default();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(&key, value.clone()).unwrap();
                    model.set(&key, &value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(store.get(&key), model.get(&key), "get {}", key);
                }
                CacheOp::Unset { key } => {
                    let removed = model.unset(&key);
                    match store.unset(&key) {
                        Ok(()) => prop_assert!(removed, "unset {} should fail", key),
                        Err(CacheError::NotFound(_)) => prop_assert!(!removed, "unset {} should succeed", key),
                        Err(err) => prop_assert!(false, "unexpected error {}", err),
                    }
                }
                CacheOp::Empty => {
                    store.empty();
                    model.empty();
                }
            }
            store.assert_consistent();
        }

        let keys: Vec<&str> = store.keys_lru().collect();
        let expected: Vec<&str> = model.order.iter().map(String::as_str).collect();
        prop_assert_eq!(keys, expected);
    }

    // Without eviction or invalidation, get returns the last value set.
    #[test]
    fn prop_last_write_wins(
        writes in prop::collection::vec((key_strategy(), value_strategy()), 1..60)
    ) {
        let mut store = new_store(4096, 0);
        let mut last = HashMap::new();

        for (key, value) in writes {
            store.set(&key, value.clone()).unwrap();
            last.insert(key, value);
        }

        for (key, value) in &last {
            prop_assert_eq!(store.get(key), Some(value));
        }
        prop_assert_eq!(store.len(), last.len());
    }

    // The charged size never exceeds the bound and the entry limit always holds.
    #[test]
    fn prop_size_bound_holds(sets in prop::collection::vec(sized_set_strategy(), 1..40)) {
        let mut store = new_store(TEST_MAX_ENTRIES, MIN_MAX_SIZE);

        for (key, size) in sets {
            let displaced = store.set_with(&key, "x".repeat(size), Release::Keep).unwrap();
            prop_assert!(store.contains(&key));
            for (evicted, _) in &displaced.evicted {
                prop_assert_ne!(evicted, &key);
            }

            let values: usize = store.keys_lru().map(|k| store.get(k).map_or(0, String::len)).sum();
            prop_assert!(values <= MIN_MAX_SIZE);
            prop_assert!(store.size_total() <= MIN_MAX_SIZE);
            store.assert_consistent();
        }
    }

    // With capacity N and no size bound, N + 1 distinct keys evict exactly the first.
    #[test]
    fn prop_first_inserted_is_evicted(capacity in 1usize..32) {
        let mut store = new_store(capacity, 0);

        for i in 0..=capacity {
            store.set(&format!("key{}", i), i.to_string()).unwrap();
        }

        prop_assert!(store.get("key0").is_none());
        for i in 1..=capacity {
            let key = format!("key{}", i);
            prop_assert_eq!(store.get(&key).cloned(), Some(i.to_string()));
        }
    }
}
