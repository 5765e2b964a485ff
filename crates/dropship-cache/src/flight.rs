//! In-flight request tracking.
//!
//! Two callers that miss the same key would otherwise both go to the
//! network. Holding an [`InFlightGuard`] marks the key as being fetched
//! until the guard drops.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Set of keys with a fetch in progress. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `None` if another caller holds it.
    pub fn try_begin(&self, key: &str) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key: key.to_string(),
        })
    }

    /// Whether a fetch for `key` is in progress.
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlightGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_refused() {
        let flights = InFlight::new();
        let guard = flights.try_begin("search:shoes:1");
        assert!(guard.is_some());
        assert!(flights.try_begin("search:shoes:1").is_none());
        assert!(flights.try_begin("search:shoes:2").is_some());
    }

    #[test]
    fn test_drop_releases_key() {
        let flights = InFlight::new();
        {
            let guard = flights.try_begin("stats").unwrap();
            assert_eq!(guard.key(), "stats");
            assert!(flights.is_in_flight("stats"));
        }
        assert!(!flights.is_in_flight("stats"));
        assert!(flights.is_empty());
    }
}
