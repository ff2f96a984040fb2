//! Bounded retry with capped exponential backoff.
//!
//! Attempt 0 runs immediately. After the `n`-th consecutive failure the
//! executor sleeps [`BackoffPolicy::delay_for`]`(n)` and tries again, up to
//! `max_retries + 1` attempts in total. Every error kind is retried the
//! same way.

use dashmap::DashMap;
use payhuk_core::{BackoffPolicy, QueryKey, QueryResult};
use std::future::Future;

/// Failed-attempt counts per key, kept for diagnostics.
///
/// A key's record is overwritten on every failure and removed on success,
/// so an absent key reads as zero.
#[derive(Debug, Default)]
pub struct AttemptLedger {
    failures: DashMap<QueryKey, u32>,
}

impl AttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failures(&self, key: &QueryKey, failures: u32) {
        self.failures.insert(key.clone(), failures);
    }

    pub fn reset(&self, key: &QueryKey) {
        self.failures.remove(key);
    }

    pub fn get(&self, key: &QueryKey) -> u32 {
        self.failures.get(key).map(|count| *count).unwrap_or(0)
    }

    pub fn clear(&self) {
        self.failures.clear();
    }
}

/// Runs an operation until it succeeds or its attempt budget is spent.
#[derive(Debug, Default)]
pub struct RetryExecutor {
    backoff: BackoffPolicy,
    ledger: AttemptLedger,
}

impl RetryExecutor {
    pub fn new(backoff: BackoffPolicy) -> Self {
        Self {
            backoff,
            ledger: AttemptLedger::new(),
        }
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    pub fn ledger(&self) -> &AttemptLedger {
        &self.ledger
    }

    /// Failed attempts recorded for `key` by the most recent run.
    pub fn retry_count(&self, key: &QueryKey) -> u32 {
        self.ledger.get(key)
    }

    /// Invoke `operation` at most `max_retries + 1` times.
    ///
    /// Returns the first success, or the last error once the budget is spent.
    pub async fn run<T, F, Fut>(
        &self,
        key: &QueryKey,
        max_retries: u32,
        mut operation: F,
    ) -> QueryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = QueryResult<T>>,
    {
        let mut failures: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if failures > 0 {
                        tracing::debug!(
                            key = %key,
                            failures,
                            "Query recovered after retry"
                        );
                    }
                    self.ledger.reset(key);
                    return Ok(value);
                }
                Err(e) => {
                    let failure_index = failures;
                    failures = failures.saturating_add(1);
                    self.ledger.record_failures(key, failures);

                    if failure_index >= max_retries {
                        tracing::error!(
                            key = %key,
                            attempts = failures,
                            error = %e,
                            "Query failed after exhausting retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff.delay_for(failure_index);
                    tracing::warn!(
                        key = %key,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Query attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
