//! Query facade: cache lookup, retried fetch, cache population.

use payhuk_core::{QueryKey, QueryOptions, QueryResult, TableQuery};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::cache::{CacheRead, CacheStats, TtlCache};
use crate::config::QueryConfig;
use crate::retry::RetryExecutor;
use crate::source::TableSource;
use crate::timeout::race_timeout;

/// Resilient read path for backend queries.
///
/// Cloning is cheap and clones share one cache and one attempt ledger, so a
/// single client can be handed to every task that reads backend data.
///
/// # Example
///
/// ```ignore
/// let client = QueryClient::with_defaults();
/// let read: CacheRead<Vec<Product>> = client
///     .query_table(&source, &TableQuery::new("products").with_eq("store_id", id), None)
///     .await?;
/// if read.was_cache_hit() {
///     tracing::debug!(staleness_ms = read.staleness().as_millis() as u64, "served products from cache");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QueryClient {
    cache: Arc<TtlCache>,
    executor: Arc<RetryExecutor>,
    config: QueryConfig,
}

impl QueryClient {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            cache: Arc::new(TtlCache::new()),
            executor: Arc::new(RetryExecutor::new(config.backoff)),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(QueryConfig::default())
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Run `fetch` behind the cache, the timeout race and the retry executor.
    ///
    /// A live cached value is returned without calling `fetch`. Otherwise
    /// `fetch` is invoked up to `options.max_retries + 1` times, each attempt
    /// bounded by `options.timeout`. Only successful results are cached.
    ///
    /// # Errors
    ///
    /// * `QueryError::InvalidArgument` - `options.timeout` is zero; `fetch` is never called
    /// * the last attempt's error once the retry budget is spent
    pub async fn execute<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        mut fetch: F,
    ) -> QueryResult<CacheRead<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = QueryResult<T>>,
    {
        options.validate()?;

        if options.cache_enabled {
            if let Some(entry) = self.cache.entry(key) {
                match T::deserialize(entry.value()) {
                    Ok(value) => {
                        tracing::debug!(key = %key, "Query served from cache");
                        return Ok(CacheRead::from_cache(value, &entry));
                    }
                    Err(e) => {
                        self.cache.record_miss();
                        tracing::warn!(
                            key = %key,
                            error = %e,
                            "Cached value does not match requested type, refetching"
                        );
                    }
                }
            }
        }

        let value = self
            .executor
            .run(key, options.max_retries, || race_timeout(options.timeout, fetch()))
            .await?;

        if options.cache_enabled {
            match serde_json::to_value(&value) {
                Ok(json) => self.cache.set(key.clone(), json, options.cache_ttl),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Query result not cacheable");
                }
            }
        }

        Ok(CacheRead::from_source(value))
    }

    /// Read rows from `source`, keyed by the query's canonical form.
    ///
    /// With no `options` the configured table budget applies (6 s per
    /// attempt, 1 retry, cached for 3 minutes by default). Rows are decoded
    /// into `T`; a decode failure counts as a failed attempt.
    pub async fn query_table<T, S>(
        &self,
        source: &S,
        query: &TableQuery,
        options: Option<&QueryOptions>,
    ) -> QueryResult<CacheRead<T>>
    where
        T: Serialize + DeserializeOwned,
        S: TableSource + ?Sized,
    {
        let key = query.cache_key();
        let options = options.unwrap_or(&self.config.table_options);
        self.execute(&key, options, move || async move {
            let rows = source.select(query).await?;
            Ok(serde_json::from_value::<T>(rows)?)
        })
        .await
    }

    /// Drop every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Query cache cleared");
    }

    /// Drop one cached result. Returns whether anything was stored.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.cache.invalidate(key)
    }

    /// Failed attempts recorded for `key`; zero after a success or if never run.
    pub fn retry_count(&self, key: &QueryKey) -> u32 {
        self.executor.retry_count(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::with_defaults()
    }
}
