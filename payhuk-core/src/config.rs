//! Configuration types

use crate::constants::*;
use crate::error::{ConfigError, QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry delay schedule.
///
/// The delay after the `n`-th consecutive failure (0-based) is
/// `min(initial_delay * 2^n, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(DEFAULT_BACKOFF_INITIAL_MS),
            max_delay: Duration::from_millis(DEFAULT_BACKOFF_MAX_MS),
        }
    }
}

impl BackoffPolicy {
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
        }
    }

    /// No waiting between attempts.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Delay to wait after `failure_index` failures have already been retried.
    pub fn delay_for(&self, failure_index: u32) -> Duration {
        let factor = 1u32.checked_shl(failure_index).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Validate the policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_delay < self.initial_delay {
            return Err(ConfigError::InvalidValue {
                field: "max_delay".to_string(),
                value: format!("{:?}", self.max_delay),
                reason: format!(
                    "max_delay must not be smaller than initial_delay ({:?})",
                    self.initial_delay
                ),
            });
        }
        Ok(())
    }
}

/// Per-call options for the query facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Deadline for a single attempt.
    pub timeout: Duration,
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Whether results are read from and written to the cache.
    pub cache_enabled: bool,
    /// Lifetime of a cached result.
    pub cache_ttl: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            cache_enabled: true,
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used for backend table reads.
    pub fn table_defaults() -> Self {
        Self {
            timeout: Duration::from_millis(TABLE_QUERY_TIMEOUT_MS),
            max_retries: TABLE_MAX_RETRIES,
            cache_enabled: true,
            cache_ttl: Duration::from_millis(TABLE_CACHE_TTL_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Total number of attempts these options allow.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Reject options that break the caller contract.
    pub fn validate(&self) -> QueryResult<()> {
        if self.timeout.is_zero() {
            return Err(QueryError::invalid_argument(
                "timeout",
                "timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_backoff_schedule() {
        let backoff = BackoffPolicy::default();
        assert_eq!(backoff.delay_for(0), Duration::from_millis(1000));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(2000));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(4000));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(5000));
        assert_eq!(backoff.delay_for(40), Duration::from_millis(5000));
    }

    #[test]
    fn test_backoff_validate() {
        assert!(BackoffPolicy::default().validate().is_ok());
        assert!(BackoffPolicy::immediate().validate().is_ok());

        let inverted = BackoffPolicy::new(Duration::from_secs(5), Duration::from_secs(1));
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_query_options_defaults() {
        let options = QueryOptions::default();
        assert_eq!(options.timeout, Duration::from_millis(8000));
        assert_eq!(options.max_retries, 2);
        assert!(options.cache_enabled);
        assert_eq!(options.cache_ttl, Duration::from_millis(300_000));
        assert_eq!(options.max_attempts(), 3);
    }

    #[test]
    fn test_table_defaults() {
        let options = QueryOptions::table_defaults();
        assert_eq!(options.timeout, Duration::from_millis(6000));
        assert_eq!(options.max_retries, 1);
        assert!(options.cache_enabled);
        assert_eq!(options.cache_ttl, Duration::from_millis(180_000));
    }

    #[test]
    fn test_query_options_builder() {
        let options = QueryOptions::new()
            .with_timeout(Duration::from_millis(250))
            .with_retries(0)
            .with_cache(false)
            .with_ttl(Duration::from_secs(1));

        assert_eq!(options.timeout, Duration::from_millis(250));
        assert_eq!(options.max_retries, 0);
        assert!(!options.cache_enabled);
        assert_eq!(options.cache_ttl, Duration::from_secs(1));
        assert_eq!(options.max_attempts(), 1);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let options = QueryOptions::new().with_timeout(Duration::ZERO);
        assert!(matches!(
            options.validate(),
            Err(QueryError::InvalidArgument { ref field, .. }) if field == "timeout"
        ));
    }

    proptest! {
        /// Property: delays never decrease and never exceed the cap.
        #[test]
        fn prop_backoff_monotonic_and_capped(
            initial_ms in 0u64..2_000,
            extra_ms in 0u64..10_000,
            n in 0u32..64,
        ) {
            let backoff = BackoffPolicy::new(
                Duration::from_millis(initial_ms),
                Duration::from_millis(initial_ms + extra_ms),
            );
            prop_assert!(backoff.delay_for(n) <= backoff.delay_for(n + 1));
            prop_assert!(backoff.delay_for(n) <= backoff.max_delay);
        }
    }
}
