//! Fixed limits and defaults for the edge service.

/// Upper bound on one payment gateway round trip.
pub const PAYMENT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Extra attempts for idempotent gateway reads (`get_payment`, `verify_payment`).
pub const PAYMENT_READ_RETRIES: u32 = 1;

/// Lifetime of a signed download URL.
pub const SIGNED_URL_TTL_SECS: i64 = 60;

/// Clock skew tolerated when checking session expiry.
pub const SESSION_LEEWAY_SECS: i64 = 30;

pub const DEFAULT_MONEROO_API_URL: &str = "https://api.moneroo.io/v1";

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Preflight cache duration.
pub const CORS_MAX_AGE_SECS: u64 = 86400;

pub const DEFAULT_LOG_FILTER: &str =
    "payhuk_edge=debug,payhuk_query=debug,tower_http=debug,info";
