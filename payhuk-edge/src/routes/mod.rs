//! HTTP routes for the edge service.
//!
//! - `GET  /health`
//! - `POST /functions/moneroo`
//! - `POST /functions/download-url`
//!
//! CORS is the outermost layer so every response, errors included, carries
//! the CORS headers, and preflight `OPTIONS` requests never reach a handler.

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::EdgeConfig;
use crate::state::EdgeState;

pub mod download;
pub mod health;
pub mod payment;

/// Create the service router.
pub fn create_router(state: EdgeState, config: &EdgeConfig) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/functions/moneroo", post(payment::relay))
        .route("/functions/download-url", post(download::create_download_url))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

/// Build the CORS layer from EdgeConfig.
///
/// With no configured origins every origin is allowed, which is what the
/// storefront's browser clients expect from the edge functions.
pub fn build_cors_layer(config: &EdgeConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
