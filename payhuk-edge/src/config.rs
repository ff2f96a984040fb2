//! Edge Service Configuration
//!
//! Loaded from environment variables. Secrets are optional at load time: an
//! endpoint whose secret is missing answers with `MISSING_CONFIGURATION`
//! instead of preventing the whole service from starting.

use payhuk_core::ConfigError;
use payhuk_query::QueryConfig;
use secrecy::SecretString;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::constants::{CORS_MAX_AGE_SECS, DEFAULT_BIND_HOST, DEFAULT_MONEROO_API_URL, DEFAULT_PORT};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::InvalidValue {
                field: "PAYHUK_LOG_FORMAT".to_string(),
                value: other.to_string(),
                reason: "expected 'json' or 'pretty'".to_string(),
            }),
        }
    }
}

/// Configuration for the edge service.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// Bearer secret for the payment gateway API.
    pub moneroo_secret: Option<SecretString>,

    /// Payment gateway base URL.
    pub moneroo_api_url: String,

    /// Backend project URL; download URLs are minted by its storage API.
    pub supabase_url: Option<String>,

    /// HS256 secret that signs user session tokens.
    pub jwt_secret: Option<SecretString>,

    /// Service key allowed to sign storage objects.
    pub supabase_service_key: Option<SecretString>,

    /// Allowed CORS origins. Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    pub bind_host: String,
    pub port: u16,
    pub log_format: LogFormat,

    /// Settings for the query layer used by gateway reads.
    pub query: QueryConfig,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            moneroo_secret: None,
            moneroo_api_url: DEFAULT_MONEROO_API_URL.to_string(),
            supabase_url: None,
            jwt_secret: None,
            supabase_service_key: None,
            cors_origins: Vec::new(),
            cors_max_age_secs: CORS_MAX_AGE_SECS,
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
            query: QueryConfig::default(),
        }
    }
}

impl EdgeConfig {
    /// Create EdgeConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MONEROO_SECRET_KEY`: payment gateway secret
    /// - `MONEROO_API_URL`: gateway base URL (default: https://api.moneroo.io/v1)
    /// - `SUPABASE_URL`: backend project URL
    /// - `SUPABASE_JWT_SECRET`: session token secret
    /// - `SUPABASE_SERVICE_ROLE_KEY`: storage key used to sign download URLs
    /// - `PAYHUK_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    /// - `PAYHUK_BIND`: listen host (default: 0.0.0.0)
    /// - `PORT`: listen port (default: 8000)
    /// - `PAYHUK_LOG_FORMAT`: "json" or "pretty" (default: json)
    ///
    /// plus the query layer variables read by [`QueryConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let secret = |name: &str| non_empty(name).map(|v| SecretString::new(v.into()));

        let defaults = Self::default();

        let cors_origins = non_empty("PAYHUK_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?,
            None => defaults.port,
        };

        let log_format = match non_empty("PAYHUK_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            moneroo_secret: secret("MONEROO_SECRET_KEY"),
            moneroo_api_url: non_empty("MONEROO_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.moneroo_api_url),
            supabase_url: non_empty("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            jwt_secret: secret("SUPABASE_JWT_SECRET"),
            supabase_service_key: secret("SUPABASE_SERVICE_ROLE_KEY"),
            cors_origins,
            cors_max_age_secs: defaults.cors_max_age_secs,
            bind_host: non_empty("PAYHUK_BIND").unwrap_or(defaults.bind_host),
            port,
            log_format,
            query: QueryConfig::from_lookup(&lookup)?,
        })
    }

    /// Socket address to listen on.
    ///
    /// The host is an IP literal, v4 or v6; brackets around a v6 host are
    /// accepted.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.bind_host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip = host.parse::<IpAddr>().map_err(|e| ConfigError::InvalidValue {
            field: "PAYHUK_BIND".to_string(),
            value: self.bind_host.clone(),
            reason: e.to_string(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
