//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation and store invariants.

use proptest::prelude::*;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;

use crate::cache::{
    CacheEntry, CacheKey, CacheNamespace, CachePrefix, CacheStats, CacheStore,
    InvalidationBroadcaster, ManualClock, MemoryStore,
};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const T0: u64 = 1_700_000_000_000;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

// == Strategies ==
/// Query parameter names and values, including delimiter characters
fn param_strategy() -> impl Strategy<Value = (String, String)> {
    ("[a-z_]{1,8}", "[a-zA-Z0-9 :&=?~%/]{0,12}")
}

/// Distinct parameter names
fn params_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(param_strategy(), 0..6).prop_map(|params| {
        let mut seen = HashSet::new();
        params
            .into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect()
    })
}

/// Paths from the endpoint catalog
fn catalog_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/petitions".to_string()),
        Just("/categories".to_string()),
        "[a-z0-9-]{1,12}".prop_map(|slug| format!("/petition/{}", slug)),
        "[0-9]{1,4}".prop_map(|id| format!("/petitions/{}", id)),
        "[0-9]{1,4}".prop_map(|id| format!("/users/{}/signatures", id)),
    ]
}

fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-z:~%0-9]{1,48}"
}

fn build(path: &str, params: &[(String, String)]) -> CacheKey {
    CacheKey::build(
        &Method::GET,
        path,
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Reordering query parameters never changes the key.
    #[test]
    fn prop_key_stable_under_reordering(
        path in catalog_path_strategy(),
        params in params_strategy(),
        seed in any::<u64>(),
    ) {
        let mut shuffled = params.clone();
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();
        }

        prop_assert_eq!(build(&path, &params), build(&path, &shuffled));
    }

    // Distinct (path, params) pairs from the catalog never share a key.
    #[test]
    fn prop_key_separation(
        path_a in catalog_path_strategy(),
        params_a in params_strategy(),
        path_b in catalog_path_strategy(),
        params_b in params_strategy(),
    ) {
        let mut sorted_a = params_a.clone();
        sorted_a.sort();
        let mut sorted_b = params_b.clone();
        sorted_b.sort();
        prop_assume!(path_a != path_b || sorted_a != sorted_b);

        prop_assert_ne!(build(&path_a, &params_a), build(&path_b, &params_b));
    }

    // A key always falls under its own namespace prefix and under no other
    // named namespace.
    #[test]
    fn prop_namespace_prefix_is_exclusive(
        path in catalog_path_strategy(),
        params in params_strategy(),
    ) {
        let key = build(&path, &params);
        let named = [
            CacheNamespace::Petitions,
            CacheNamespace::Petition,
            CacheNamespace::Categories,
            CacheNamespace::UserSignatures,
        ];

        for namespace in named {
            let prefix = CachePrefix::namespace(namespace.clone());
            prop_assert_eq!(prefix.matches(&key), &namespace == key.namespace());
        }
    }

    // The store never holds more than its capacity.
    #[test]
    fn prop_capacity_enforcement(
        keys in prop::collection::vec(valid_key_strategy(), 1..200)
    ) {
        let max_entries = 50;
        block_on(async {
            let store = MemoryStore::new(max_entries, Arc::new(ManualClock::new(T0)));
            for key in keys {
                store.put(CacheEntry::new(key, "v", T0, 60)).await.unwrap();
                assert!(store.len().await <= max_entries);
            }
        });
    }

    // The last write to a key wins.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in "[a-z]{1,16}",
        value2 in "[a-z]{1,16}",
    ) {
        let found = block_on(async {
            let store = MemoryStore::new(TEST_MAX_ENTRIES, Arc::new(ManualClock::new(T0)));
            store.put(CacheEntry::new(key.clone(), value1, T0, 60)).await.unwrap();
            store.put(CacheEntry::new(key.clone(), value2.clone(), T0, 60)).await.unwrap();
            store.get(&key).await.unwrap()
        });

        prop_assert_eq!(found.map(|entry| entry.value), Some(value2));
    }

    // Entries are servable strictly before their TTL and never at or after it.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        ttl in 1u64..3600,
        elapsed_ms in 0u64..7_200_000,
    ) {
        let found = block_on(async {
            let clock = Arc::new(ManualClock::new(T0));
            let store = MemoryStore::new(TEST_MAX_ENTRIES, clock.clone());
            store.put(CacheEntry::new(key.clone(), "v", T0, ttl)).await.unwrap();
            clock.advance(Duration::from_millis(elapsed_ms));
            store.get(&key).await.unwrap()
        });

        prop_assert_eq!(found.is_some(), elapsed_ms < ttl * 1000);
    }

    // After invalidating a namespace no key under it is servable, whatever
    // TTL it had left, and keys elsewhere survive.
    #[test]
    fn prop_invalidation_effect(
        entries in prop::collection::vec(
            (catalog_path_strategy(), params_strategy(), 1u64..10_000),
            1..30
        )
    ) {
        block_on(async {
            let store = Arc::new(MemoryStore::new(TEST_MAX_ENTRIES, Arc::new(ManualClock::new(T0))));
            let keys: Vec<CacheKey> = entries
                .iter()
                .map(|(path, params, _)| build(path, params))
                .collect();
            for (key, (_, _, ttl)) in keys.iter().zip(&entries) {
                store.put(CacheEntry::new(key.as_str(), "{}", T0, *ttl)).await.unwrap();
            }

            let prefix = CachePrefix::namespace(CacheNamespace::Petitions);
            let invalidator = InvalidationBroadcaster::new(
                store.clone(),
                Arc::new(CacheStats::new()),
                Duration::from_millis(100),
            );
            invalidator.invalidate_prefix(&prefix).await;

            for key in &keys {
                let live = store.get(key.as_str()).await.unwrap().is_some();
                assert_eq!(live, !prefix.matches(key), "key {}", key);
            }
        });
    }
}
