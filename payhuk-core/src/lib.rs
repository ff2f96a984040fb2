//! Payhuk Core - Query Layer Types
//!
//! Pure data structures shared by the query layer and the edge service:
//! error taxonomy, per-call query options, backoff policy and query identity.
//! This crate contains no I/O.

pub mod config;
pub mod constants;
pub mod error;
pub mod query;

pub use config::{BackoffPolicy, QueryOptions};
pub use error::{ConfigError, PayhukError, PayhukResult, QueryError, QueryResult};
pub use query::{EqFilter, OrderBy, QueryKey, TableQuery};
