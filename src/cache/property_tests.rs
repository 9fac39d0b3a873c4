//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the expiring cache against a plain `HashMap` model.
//! All entries use long lifetimes, so only explicit operations remove them.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::cache::{ExpirationQueue, ExpiringCache, ExpiryDescriptor};

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = u8> {
    0u8..6
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: u8 },
    Get { key: String },
    Remove { key: String },
    Renew { key: String },
    ExpireKey { key: String },
    ExpireValue { value: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Remove { key }),
        key_strategy().prop_map(|key| CacheOp::Renew { key }),
        key_strategy().prop_map(|key| CacheOp::ExpireKey { key }),
        value_strategy().prop_map(|value| CacheOp::ExpireValue { value }),
    ]
}

fn sorted(mut values: Vec<u8>) -> Vec<u8> {
    values.sort_unstable();
    values
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // The cache behaves like a HashMap, and every value that leaves the map
    // through overwrite, removal or forced expiration reaches the listener
    // exactly once.
    #[test]
    fn prop_matches_hashmap_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let cache: ExpiringCache<String, u8> = ExpiringCache::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        cache.add_expired_entry_listener(move |v: &u8| -> anyhow::Result<()> {
            sink.lock().unwrap().push(*v);
            Ok(())
        });

        let mut model: HashMap<String, u8> = HashMap::new();
        let mut expected_expired: Vec<u8> = Vec::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    let previous = cache.put(key.clone(), value);
                    let model_previous = model.insert(key, value);
                    prop_assert_eq!(previous, model_previous);
                    expected_expired.extend(model_previous);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).copied());
                }
                CacheOp::Remove { key } => {
                    let removed = cache.remove(&key);
                    let model_removed = model.remove(&key);
                    prop_assert_eq!(removed, model_removed);
                    expected_expired.extend(model_removed);
                }
                CacheOp::Renew { key } => {
                    prop_assert_eq!(cache.renew_key(&key), model.contains_key(&key));
                }
                CacheOp::ExpireKey { key } => {
                    cache.expire_key(&key);
                    expected_expired.extend(model.remove(&key));
                }
                CacheOp::ExpireValue { value } => {
                    cache.expire_value(&value);
                    let matching: Vec<String> = model
                        .iter()
                        .filter(|(_, v)| **v == value)
                        .map(|(k, _)| k.clone())
                        .collect();
                    for key in matching {
                        expected_expired.extend(model.remove(&key));
                    }
                }
            }

            prop_assert_eq!(cache.len(), model.len(), "Size mismatch");
        }

        for (key, value) in &model {
            prop_assert!(cache.contains_key(key));
            prop_assert!(cache.contains_value(value));
        }
        prop_assert_eq!(
            sorted(seen.lock().unwrap().clone()),
            sorted(expected_expired),
            "Listener notifications mismatch"
        );
    }

    // Draining at any instant yields exactly the due descriptors, ordered
    // by deadline and then by insertion.
    #[test]
    fn prop_queue_drains_due_in_order(
        lifetimes in prop::collection::vec(0u64..1000, 1..60),
        cutoff in 0u64..1200
    ) {
        let now = Instant::now();
        let mut queue = ExpirationQueue::new();
        for (seq, ms) in lifetimes.iter().enumerate() {
            queue.insert(ExpiryDescriptor::new(seq, seq as u64, now, Duration::from_millis(*ms)));
        }

        let due = queue.drain_due(now + Duration::from_millis(cutoff));
        let expected_count = lifetimes.iter().filter(|ms| **ms <= cutoff).count();
        prop_assert_eq!(due.len(), expected_count);
        prop_assert_eq!(queue.len(), lifetimes.len() - expected_count);

        for pair in due.windows(2) {
            prop_assert!(pair[0].order_key() < pair[1].order_key());
        }
    }
}
