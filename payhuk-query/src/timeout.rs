//! Deadline for a single asynchronous attempt.

use payhuk_core::{QueryError, QueryResult};
use std::future::Future;
use std::time::Duration;

/// Race `operation` against a timer of length `limit`.
///
/// Whichever finishes first decides the outcome. When the timer wins the
/// operation future is dropped, which cancels any I/O it still had pending.
///
/// # Errors
///
/// * `QueryError::InvalidArgument` - `limit` is zero; the operation is not polled
/// * `QueryError::Timeout` - the timer fired first
/// * whatever error the operation itself returned
pub async fn race_timeout<T, Fut>(limit: Duration, operation: Fut) -> QueryResult<T>
where
    Fut: Future<Output = QueryResult<T>>,
{
    if limit.is_zero() {
        return Err(QueryError::invalid_argument(
            "timeout",
            "timeout must be greater than zero",
        ));
    }

    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(QueryError::Timeout { limit }),
    }
}
