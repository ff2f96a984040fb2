//! Payhuk Edge Server Entry Point

use payhuk_edge::telemetry::init_tracing;
use payhuk_edge::{create_router, ApiError, ApiResult, EdgeConfig, EdgeState};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let config = EdgeConfig::from_env()?;
    init_tracing(config.log_format)?;

    let state = EdgeState::from_config(&config)?;
    let app = create_router(state, &config);

    let addr = config.bind_addr()?;
    tracing::info!(%addr, "Starting Payhuk edge server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
