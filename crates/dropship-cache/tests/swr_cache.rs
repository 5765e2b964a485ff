//! End-to-end cache behaviour over shared and file-backed stores.

use std::sync::Arc;
use std::time::Duration;

use dropship_cache::{
    cache_key, CachePolicy, CacheStatus, JsonFileStore, KvStore, ManualClock, MemoryStore,
    SwrCache,
};
use serde::{Deserialize, Serialize};

const START: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SupplierHit {
    sku: String,
    price: f64,
}

fn hits() -> Vec<SupplierHit> {
    vec![
        SupplierHit {
            sku: "AE-1001".to_string(),
            price: 12.0,
        },
        SupplierHit {
            sku: "AE-1002".to_string(),
            price: 4.5,
        },
    ]
}

#[test]
fn entry_lives_exactly_ttl_then_disappears_from_store() {
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(START);
    let cache = SwrCache::with_clock(Arc::clone(&store), clock.clone());
    let key = cache_key!("search", "phone case", 1);

    cache.set(&key, &hits(), Duration::from_millis(1_000));
    assert_eq!(cache.get::<Vec<SupplierHit>>(&key), Some(hits()));

    clock.advance(Duration::from_millis(1_001));
    assert_eq!(cache.get::<Vec<SupplierHit>>(&key), None);
    assert!(!store.exists("dropship:swr:search:phone case:1").unwrap());
}

#[test]
fn stale_entry_is_served_until_revalidated() {
    let clock = ManualClock::new(START);
    let cache = SwrCache::with_clock(MemoryStore::new(), clock.clone());
    let policy =
        CachePolicy::new(Duration::from_secs(300)).with_stale_time(Duration::from_secs(60));
    let key = "stats:dashboard";

    let (orders, status) = cache
        .get_or_fetch(key, &policy, || Ok::<_, String>(10u32))
        .unwrap();
    assert_eq!((orders, status), (10, CacheStatus::Miss));

    clock.advance(Duration::from_secs(90));
    let (orders, status) = cache
        .get_or_fetch(key, &policy, || Ok::<_, String>(99u32))
        .unwrap();
    assert_eq!((orders, status), (10, CacheStatus::Stale));

    let refreshed = cache
        .revalidate(key, &policy, || Ok::<_, String>(12u32))
        .unwrap();
    assert_eq!(refreshed, Some(12));

    let lookup = cache.lookup::<u32>(key);
    assert_eq!(lookup.status, CacheStatus::Hit);
    assert_eq!(lookup.data, Some(12));
}

#[test]
fn full_store_recovers_after_expired_entries_are_cleared() {
    let store = Arc::new(MemoryStore::with_quota(400));
    let clock = ManualClock::new(START);
    let cache = SwrCache::with_clock(Arc::clone(&store), clock.clone());
    let short = CachePolicy::new(Duration::from_secs(1));
    let long = CachePolicy::new(Duration::from_secs(600));

    assert!(cache.set_with_policy("a", &"a".repeat(150), &short));
    clock.advance(Duration::from_secs(5));

    // The write is dropped but makes room for the next one.
    assert!(!cache.set_with_policy("b", &"b".repeat(250), &long));
    assert!(store.keys().unwrap().is_empty());
    assert!(cache.set_with_policy("b", &"b".repeat(250), &long));
}

#[test]
fn file_store_keeps_entries_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let policy = CachePolicy::new(Duration::from_secs(3_600));

    {
        let store = JsonFileStore::open(&path).unwrap();
        let cache = SwrCache::with_clock(store, ManualClock::new(START));
        cache.set_with_policy("pricing:Germany:DHL", &hits(), &policy);
    }

    let store = JsonFileStore::open(&path).unwrap();
    let clock = ManualClock::new(START);
    let cache = SwrCache::with_clock(store, clock.clone());
    assert_eq!(
        cache.get::<Vec<SupplierHit>>("pricing:Germany:DHL"),
        Some(hits())
    );

    clock.advance(Duration::from_secs(3_601));
    assert_eq!(cache.clear_expired(), 1);
    assert_eq!(cache.stats().entries, 0);
}
