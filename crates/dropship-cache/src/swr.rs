//! Stale-while-revalidate cache.

use std::fmt;
use std::time::Duration;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::entry::{CacheEntry, CachePolicy};
use crate::flight::InFlight;
use crate::store::KvStore;
use crate::CacheError;

/// Namespace prepended to every storage key.
pub const DEFAULT_PREFIX: &str = "dropship:swr:";

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Fresh cache hit.
    Hit,
    /// Stale hit, caller should revalidate.
    Stale,
    /// Nothing usable in the cache.
    Miss,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Stale => write!(f, "STALE"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// Result of a lookup with freshness metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup<T> {
    /// The cached value, if usable.
    pub data: Option<T>,
    /// Lookup status.
    pub status: CacheStatus,
    /// Age of the entry.
    pub age: Option<Duration>,
}

impl<T> CacheLookup<T> {
    fn hit(data: T, age: u64) -> Self {
        Self {
            data: Some(data),
            status: CacheStatus::Hit,
            age: Some(Duration::from_millis(age)),
        }
    }

    fn stale(data: T, age: u64) -> Self {
        Self {
            data: Some(data),
            status: CacheStatus::Stale,
            age: Some(Duration::from_millis(age)),
        }
    }

    fn miss() -> Self {
        Self {
            data: None,
            status: CacheStatus::Miss,
            age: None,
        }
    }

    /// Whether the caller should refresh the entry.
    pub fn needs_revalidation(&self) -> bool {
        self.status != CacheStatus::Hit
    }
}

/// Entry counts for the cache namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub stale: usize,
    pub expired: usize,
    /// Entries that no longer parse.
    pub corrupt: usize,
    /// Stored bytes (keys and values).
    pub bytes: usize,
}

/// Stale-while-revalidate cache over a [`KvStore`].
///
/// Reads never fail: store errors and unparseable entries count as misses.
/// Writes through [`set`](Self::set) never fail either; on error the cache
/// drops expired entries so the next write has room.
pub struct SwrCache<S: KvStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    prefix: String,
    in_flight: InFlight,
}

impl<S: KvStore> SwrCache<S, SystemClock> {
    /// Create a cache over `store` using the wall clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KvStore, C: Clock> SwrCache<S, C> {
    /// Create a cache with a custom clock.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            prefix: DEFAULT_PREFIX.to_string(),
            in_flight: InFlight::new(),
        }
    }

    /// Use a different key namespace.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Keys with a revalidation in progress.
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Get a usable value (fresh or stale). Expired entries are evicted.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup(key).data
    }

    /// Get a value together with its freshness.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let storage_key = self.storage_key(key);

        let raw = match self.store.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Cache miss");
                return CacheLookup::miss();
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return CacheLookup::miss();
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) if e.is_syntax() || e.is_eof() => {
                warn!(key, error = %e, "Dropping unreadable cache entry");
                self.remove(&storage_key);
                return CacheLookup::miss();
            }
            // Readable JSON of another shape; leave it for callers of that type.
            Err(e) => {
                debug!(key, error = %e, "Cache entry type mismatch, treating as miss");
                return CacheLookup::miss();
            }
        };

        let now = self.clock.now_millis();
        let age = entry.age(now);
        if entry.is_expired(now) {
            debug!(key, age_ms = age, "Cache entry expired");
            self.remove(&storage_key);
            return CacheLookup::miss();
        }

        if entry.is_stale(now) {
            debug!(
                key,
                age_ms = age,
                remaining_ms = entry.remaining_ttl(now),
                "Cache stale hit"
            );
            CacheLookup::stale(entry.data, age)
        } else {
            debug!(
                key,
                age_ms = age,
                remaining_ms = entry.remaining_ttl(now),
                "Cache hit"
            );
            CacheLookup::hit(entry.data, age)
        }
    }

    /// Store a value that stays fresh for `ttl`.
    pub fn set<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        self.set_with_policy(key, data, &CachePolicy::new(ttl));
    }

    /// Store a value, swallowing write failures.
    ///
    /// Returns whether the write landed. A failed write triggers
    /// [`clear_expired`](Self::clear_expired).
    pub fn set_with_policy<T: Serialize>(&self, key: &str, data: &T, policy: &CachePolicy) -> bool {
        match self.try_set(key, data, policy) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Cache write failed, clearing expired entries");
                let cleared = self.clear_expired();
                debug!(cleared, "Expired entries cleared after failed write");
                false
            }
        }
    }

    /// Store a value, reporting failures.
    pub fn try_set<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        policy: &CachePolicy,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry::new(data, self.clock.now_millis(), policy);
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&self.storage_key(key), &raw)
    }

    /// Serve from cache, fetching on a miss.
    ///
    /// Stale values are returned as-is with [`CacheStatus::Stale`]; call
    /// [`revalidate`](Self::revalidate) to refresh them.
    pub fn get_or_fetch<T, F, E>(
        &self,
        key: &str,
        policy: &CachePolicy,
        fetch: F,
    ) -> Result<(T, CacheStatus), CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        let lookup = self.lookup::<T>(key);
        if let Some(data) = lookup.data {
            return Ok((data, lookup.status));
        }

        let data = fetch().map_err(|e| CacheError::FetchFailed(e.to_string()))?;
        self.set_with_policy(key, &data, policy);
        Ok((data, CacheStatus::Miss))
    }

    /// Refetch a key unless another caller is already doing so.
    ///
    /// Returns `Ok(None)` when a revalidation for `key` is in flight.
    pub fn revalidate<T, F, E>(
        &self,
        key: &str,
        policy: &CachePolicy,
        fetch: F,
    ) -> Result<Option<T>, CacheError>
    where
        T: Serialize,
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        let guard = match self.in_flight.try_begin(key) {
            Some(guard) => guard,
            None => {
                debug!(key, "Revalidation already in flight");
                return Ok(None);
            }
        };
        debug!(key = guard.key(), "Revalidating");

        let data = fetch().map_err(|e| CacheError::FetchFailed(e.to_string()))?;
        self.set_with_policy(key, &data, policy);
        Ok(Some(data))
    }

    /// Remove one key.
    pub fn invalidate(&self, key: &str) {
        self.remove(&self.storage_key(key));
    }

    /// Remove every key starting with `prefix` (within the namespace).
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let full = self.storage_key(prefix);
        self.namespaced_keys()
            .into_iter()
            .filter(|k| k.starts_with(&full))
            .filter(|k| self.remove(k))
            .count()
    }

    /// Remove expired and unreadable entries. Returns how many went.
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now_millis();
        self.namespaced_keys()
            .into_iter()
            .filter(|k| match self.raw_entry(k) {
                Some(Ok(entry)) => entry.is_expired(now),
                Some(Err(_)) => true,
                None => false,
            })
            .filter(|k| self.remove(k))
            .count()
    }

    /// Remove every entry in the namespace.
    pub fn clear(&self) -> usize {
        self.namespaced_keys()
            .into_iter()
            .filter(|k| self.remove(k))
            .count()
    }

    /// Count entries by freshness.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_millis();
        let mut stats = CacheStats::default();

        for key in self.namespaced_keys() {
            let raw = match self.store.get(&key) {
                Ok(Some(raw)) => raw,
                _ => continue,
            };
            stats.entries += 1;
            stats.bytes += key.len() + raw.len();

            match serde_json::from_str::<CacheEntry<IgnoredAny>>(&raw) {
                Ok(entry) if entry.is_expired(now) => stats.expired += 1,
                Ok(entry) if entry.is_stale(now) => stats.stale += 1,
                Ok(_) => stats.fresh += 1,
                Err(_) => stats.corrupt += 1,
            }
        }

        stats
    }

    fn namespaced_keys(&self) -> Vec<String> {
        match self.store.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(&self.prefix))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Cache key listing failed");
                Vec::new()
            }
        }
    }

    fn raw_entry(&self, storage_key: &str) -> Option<Result<CacheEntry<IgnoredAny>, CacheError>> {
        match self.store.get(storage_key) {
            Ok(Some(raw)) => Some(serde_json::from_str(&raw).map_err(CacheError::from)),
            _ => None,
        }
    }

    fn remove(&self, storage_key: &str) -> bool {
        match self.store.delete(storage_key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = storage_key, error = %e, "Cache delete failed");
                false
            }
        }
    }
}
