//! Cache entries and freshness policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Freshness thresholds for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Age after which the entry is served but flagged for revalidation.
    pub stale_time: Duration,
    /// Age after which the entry is evicted.
    pub ttl: Duration,
}

impl CachePolicy {
    /// Entry stays fresh for its whole lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            stale_time: ttl,
            ttl,
        }
    }

    /// Set the stale-while-revalidate threshold. Capped at the ttl.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time.min(self.ttl);
        self
    }
}

/// A stored value with its timestamps, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload.
    pub data: T,
    /// Creation time, ms since epoch.
    pub timestamp: i64,
    /// Hard expiry, ms after creation.
    pub ttl: u64,
    /// Freshness window, ms after creation.
    pub stale_time: u64,
}

impl<T> CacheEntry<T> {
    /// Create an entry stamped at `now`.
    pub fn new(data: T, now: i64, policy: &CachePolicy) -> Self {
        Self {
            data,
            timestamp: now,
            ttl: policy.ttl.as_millis() as u64,
            stale_time: policy.stale_time.as_millis() as u64,
        }
    }

    /// Age in milliseconds. Clock skew reads as zero.
    pub fn age(&self, now: i64) -> u64 {
        now.saturating_sub(self.timestamp).max(0) as u64
    }

    /// Past the hard expiry (`now - timestamp > ttl`).
    pub fn is_expired(&self, now: i64) -> bool {
        self.age(now) > self.ttl
    }

    /// Past the freshness window but not yet expired.
    pub fn is_stale(&self, now: i64) -> bool {
        !self.is_expired(now) && self.age(now) > self.stale_time
    }

    /// Milliseconds until expiry.
    pub fn remaining_ttl(&self, now: i64) -> u64 {
        self.ttl.saturating_sub(self.age(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CacheEntry<&'static str> {
        let policy = CachePolicy::new(Duration::from_millis(1_000))
            .with_stale_time(Duration::from_millis(400));
        CacheEntry::new("data", 10_000, &policy)
    }

    #[test]
    fn test_fresh_stale_expired() {
        let e = entry();
        assert!(!e.is_stale(10_400));
        assert!(e.is_stale(10_401));
        assert!(!e.is_expired(11_000));
        assert!(e.is_expired(11_001));
        assert!(!e.is_stale(11_001));
    }

    #[test]
    fn test_clock_skew_reads_as_fresh() {
        let e = entry();
        assert_eq!(e.age(9_000), 0);
        assert!(!e.is_expired(9_000));
    }

    #[test]
    fn test_remaining_ttl() {
        let e = entry();
        assert_eq!(e.remaining_ttl(10_250), 750);
        assert_eq!(e.remaining_ttl(20_000), 0);
    }

    #[test]
    fn test_stale_time_capped_at_ttl() {
        let policy =
            CachePolicy::new(Duration::from_secs(5)).with_stale_time(Duration::from_secs(50));
        assert_eq!(policy.stale_time, Duration::from_secs(5));
    }
}
