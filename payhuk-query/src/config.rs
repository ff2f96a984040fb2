//! Query client configuration.
//!
//! Defaults match the storefront's data hooks. Every value can be overridden
//! from the environment:
//! - `PAYHUK_QUERY_TIMEOUT_MS`: per-attempt timeout (default: 8000)
//! - `PAYHUK_QUERY_MAX_RETRIES`: retries after the first attempt (default: 2)
//! - `PAYHUK_QUERY_CACHE_ENABLED`: "true" or "false" (default: true)
//! - `PAYHUK_QUERY_CACHE_TTL_MS`: lifetime of cached results (default: 300000)
//! - `PAYHUK_BACKOFF_INITIAL_MS`: first retry delay (default: 1000)
//! - `PAYHUK_BACKOFF_MAX_MS`: retry delay cap (default: 5000)

use payhuk_core::{BackoffPolicy, ConfigError, QueryOptions};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for a [`QueryClient`](crate::QueryClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Options used by `execute` callers that have no opinion.
    pub default_options: QueryOptions,
    /// Options used for backend table reads.
    pub table_options: QueryOptions,
    /// Retry delay schedule shared by all calls.
    pub backoff: BackoffPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_options: QueryOptions::default(),
            table_options: QueryOptions::table_defaults(),
            backoff: BackoffPolicy::default(),
        }
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_options(mut self, options: QueryOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn with_table_options(mut self, options: QueryOptions) -> Self {
        self.table_options = options;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Create QueryConfig from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let options = &mut config.default_options;

        if let Some(ms) = parse_var::<u64, _>(&lookup, "PAYHUK_QUERY_TIMEOUT_MS")? {
            options.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_var::<u32, _>(&lookup, "PAYHUK_QUERY_MAX_RETRIES")? {
            options.max_retries = retries;
        }
        if let Some(enabled) = parse_var::<bool, _>(&lookup, "PAYHUK_QUERY_CACHE_ENABLED")? {
            options.cache_enabled = enabled;
            config.table_options.cache_enabled = enabled;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "PAYHUK_QUERY_CACHE_TTL_MS")? {
            config.default_options.cache_ttl = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "PAYHUK_BACKOFF_INITIAL_MS")? {
            config.backoff.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "PAYHUK_BACKOFF_MAX_MS")? {
            config.backoff.max_delay = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, options) in [
            ("PAYHUK_QUERY_TIMEOUT_MS", &self.default_options),
            ("table_options.timeout", &self.table_options),
        ] {
            if options.timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: "0".to_string(),
                    reason: "timeout must be greater than zero".to_string(),
                });
            }
        }
        self.backoff.validate()
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .to_lowercase()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue {
            field: name.to_string(),
            value: raw.clone(),
            reason: format!("could not parse as {}", std::any::type_name::<T>()),
        })
}
