//! Backend collaborator for table reads.

use async_trait::async_trait;
use payhuk_core::{QueryResult, TableQuery};
use serde_json::Value;

/// Something that can answer a [`TableQuery`] with a JSON array of rows.
///
/// Implementations perform exactly one backend round trip per call. Timeouts,
/// retries and caching are layered on top by [`QueryClient`](crate::QueryClient).
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Run the query and return the raw rows.
    async fn select(&self, query: &TableQuery) -> QueryResult<Value>;
}
