//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::constants::DEFAULT_LOG_FILTER;
use crate::error::{ApiError, ApiResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Must be called once, before the
/// first span is entered.
pub fn init_tracing(format: LogFormat) -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (json, pretty) = match format {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(tracing_subscriber::fmt::layer().pretty())),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(pretty)
        .try_init()
        .map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        format = ?format,
        "Telemetry initialized"
    );

    Ok(())
}
