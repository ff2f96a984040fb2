//! Payhuk Query - Resilient Backend Reads
//!
//! Every backend read in the storefront goes through [`QueryClient`], which
//! composes three pieces:
//!
//! - [`TtlCache`]: results keyed by query identity, expired lazily on read
//! - [`race_timeout`]: a per-attempt deadline
//! - [`RetryExecutor`]: bounded retries with capped exponential backoff
//!
//! A live cache entry short-circuits the whole pipeline. On a miss the fetch
//! runs under the timeout race, retried by the executor, and only a
//! successful result is written back.
//!
//! Table reads go through [`TableSource`]; [`RestTableSource`] speaks
//! PostgREST over HTTP.

pub mod cache;
pub mod client;
pub mod config;
pub mod rest;
pub mod retry;
pub mod source;
pub mod timeout;

pub use cache::{CacheEntry, CacheRead, CacheStats, TtlCache};
pub use client::QueryClient;
pub use config::QueryConfig;
pub use rest::{RestConfig, RestTableSource};
pub use retry::{AttemptLedger, RetryExecutor};
pub use source::TableSource;
pub use timeout::race_timeout;

pub use payhuk_core::{
    BackoffPolicy, QueryError, QueryKey, QueryOptions, QueryResult, TableQuery,
};
