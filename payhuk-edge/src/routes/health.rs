//! Liveness check.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::EdgeState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub payments_configured: bool,
    pub downloads_configured: bool,
    pub query_cache: QueryCacheHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCacheHealth {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

pub async fn health(State(state): State<EdgeState>) -> Json<HealthResponse> {
    let stats = state.queries.stats();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        payments_configured: state.gateway.is_some(),
        downloads_configured: state.sessions.is_some() && state.signer.is_some(),
        query_cache: QueryCacheHealth {
            entries: stats.entry_count,
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
        },
    })
}
