//! Key/value storage with expiry-based invalidation.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use payhuk_core::QueryKey;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Horizon used when `now + ttl` overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// A cached value and its lifetime.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Value,
    stored_at: Instant,
    expires_at: Instant,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        let stored_at = Instant::now();
        let expires_at = stored_at
            .checked_add(ttl)
            .unwrap_or_else(|| stored_at + FAR_FUTURE);
        Self {
            value,
            stored_at,
            expires_at,
            cached_at: Utc::now(),
        }
    }

    /// An entry is live strictly before its expiry instant.
    pub fn is_live_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn stored_at(&self) -> Instant {
        self.stored_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Wall-clock time the entry was written.
    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups that returned a live entry.
    pub hits: u64,
    /// Number of lookups that found nothing usable.
    pub misses: u64,
    /// Number of entries currently stored, live or not yet collected.
    pub entry_count: u64,
    /// Number of stale entries dropped on read.
    pub expired: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Concurrent TTL cache keyed by [`QueryKey`].
///
/// Writes are last-write-wins with no versioning. There is no capacity
/// bound: key cardinality is the caller's responsibility.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: DashMap<QueryKey, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the stored value if it has not expired.
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.entry(key).map(CacheEntry::into_value)
    }

    /// Get the full entry if it has not expired.
    ///
    /// A stale entry is removed as a side effect.
    pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_live_at(now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.clone());
            }
        }

        // The read guard is released above; re-check under the write lock so
        // a concurrent fresh `set` is not thrown away.
        if self
            .entries
            .remove_if(key, |_, entry| !entry.is_live_at(now))
            .is_some()
        {
            self.expired.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Turn the last recorded hit into a miss.
    ///
    /// For callers that found a live entry they could not use.
    pub fn record_miss(&self) {
        let _ = self
            .hits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |hits| hits.checked_sub(1));
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Store a value for `ttl`, replacing any existing entry.
    pub fn set(&self, key: QueryKey, value: Value, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Remove one entry. Returns whether anything was stored under the key.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}
