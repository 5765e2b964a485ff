//! Stale-while-revalidate caching over pluggable key-value stores.
//!
//! Used in front of supplier searches and dashboard stats so repeated
//! lookups do not hit the network. Entries carry two thresholds: after the
//! *stale time* they are still served but flagged for revalidation, after
//! the *ttl* they are evicted.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use dropship_cache::{cache_key, CachePolicy, MemoryStore, SwrCache};
//!
//! let cache = SwrCache::new(MemoryStore::new());
//! let key = cache_key!("search", "phone case", 1);
//!
//! cache.set(&key, &vec!["sku-1", "sku-2"], Duration::from_secs(300));
//! let hits: Option<Vec<String>> = cache.get(&key);
//! assert_eq!(hits.unwrap().len(), 2);
//!
//! let policy = CachePolicy::new(Duration::from_secs(300)).with_stale_time(Duration::from_secs(60));
//! let (stats, _status) = cache
//!     .get_or_fetch("stats:today", &policy, || Ok::<_, std::io::Error>(42u32))
//!     .unwrap();
//! assert_eq!(stats, 42);
//! ```

mod clock;
mod entry;
mod error;
mod flight;
mod key;
mod store;
mod swr;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, CachePolicy};
pub use error::CacheError;
pub use flight::{InFlight, InFlightGuard};
pub use store::{JsonFileStore, KvStore, MemoryStore};
pub use swr::{CacheLookup, CacheStats, CacheStatus, SwrCache, DEFAULT_PREFIX};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cache_key;
    pub use crate::{
        CacheError, CacheLookup, CachePolicy, CacheStatus, Clock, KvStore, MemoryStore, SwrCache,
        SystemClock,
    };
}
