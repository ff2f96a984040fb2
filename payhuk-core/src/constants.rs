//! Constants for the Payhuk query layer
//!
//! Default budgets for generic queries and for backend table reads.

// ============================================================================
// GENERIC QUERIES
// ============================================================================

/// Default per-attempt timeout for a query (8 seconds)
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 8_000;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default time-to-live for cached query results (5 minutes)
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;

// ============================================================================
// TABLE READS
// ============================================================================

/// Per-attempt timeout for backend table reads (6 seconds)
pub const TABLE_QUERY_TIMEOUT_MS: u64 = 6_000;

/// Retries for backend table reads
pub const TABLE_MAX_RETRIES: u32 = 1;

/// Time-to-live for cached table reads (3 minutes)
pub const TABLE_CACHE_TTL_MS: u64 = 180_000;

// ============================================================================
// BACKOFF
// ============================================================================

/// Delay before the first retry
pub const DEFAULT_BACKOFF_INITIAL_MS: u64 = 1_000;

/// Upper bound on any single retry delay
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 5_000;
