//! Query results that carry their provenance.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

use super::ttl::CacheEntry;

/// Result of a facade read, carrying cache metadata.
///
/// This wrapper lets callers see whether the value came from the cache or
/// from a fresh fetch, and how old it is.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    /// When this value was cached (or fetched).
    cached_at: DateTime<Utc>,
    stored_at: Instant,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// Create a new read from a live cache entry.
    pub fn from_cache(value: T, entry: &CacheEntry) -> Self {
        Self {
            value,
            cached_at: entry.cached_at(),
            stored_at: entry.stored_at(),
            was_cache_hit: true,
        }
    }

    /// Create a new read from a fresh fetch (cache miss).
    pub fn from_source(value: T) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
            stored_at: Instant::now(),
            was_cache_hit: false,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Time since the value was fetched from its source.
    pub fn staleness(&self) -> Duration {
        self.stored_at.elapsed()
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Map the inner value to a new type.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            cached_at: self.cached_at,
            stored_at: self.stored_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use payhuk_core::QueryKey;
    use serde_json::json;

    #[test]
    fn test_cache_read_from_source() {
        let read = CacheRead::from_source(42i32);
        assert!(!read.was_cache_hit());
        assert!(read.was_cache_miss());
        assert_eq!(read.into_value(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_read_from_cache_reports_staleness() {
        let cache = TtlCache::new();
        let key = QueryKey::from("k");
        cache.set(key.clone(), json!("v"), Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(5)).await;
        let entry = cache.entry(&key).expect("entry should be live");
        let read = CacheRead::from_cache("v".to_string(), &entry);

        assert!(read.was_cache_hit());
        assert_eq!(read.cached_at(), entry.cached_at());
        assert_eq!(read.staleness(), Duration::from_secs(5));
    }

    #[test]
    fn test_cache_read_map() {
        let read = CacheRead::from_source(42i32);
        let mapped = read.map(|v| v.to_string());
        assert_eq!(mapped.value(), "42");
    }
}
