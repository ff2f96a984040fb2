//! In-memory TTL cache for query results.
//!
//! Entries expire lazily: nothing sweeps the map in the background, a stale
//! entry is dropped the next time someone reads it. Reads hand back a
//! [`CacheRead<T>`] so callers can tell a cache hit from a fresh fetch and
//! see how old the data is.
//!
//! # Example
//!
//! ```ignore
//! let cache = TtlCache::new();
//! cache.set(QueryKey::from("products"), json!([1, 2, 3]), Duration::from_secs(60));
//!
//! if let Some(rows) = cache.get(&QueryKey::from("products")) {
//!     tracing::debug!(?rows, "served from cache");
//! }
//! ```

pub mod read;
pub mod ttl;

pub use read::CacheRead;
pub use ttl::{CacheEntry, CacheStats, TtlCache};
