//! Shared handler state.

use payhuk_core::QueryOptions;
use payhuk_query::QueryClient;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::{Clock, SessionVerifier, SystemClock};
use crate::config::EdgeConfig;
use crate::constants::{PAYMENT_READ_RETRIES, PAYMENT_UPSTREAM_TIMEOUT_SECS};
use crate::error::ApiResult;
use crate::gateway::{MonerooGateway, PaymentGateway};
use crate::signer::{ObjectSigner, StorageSigner};

/// State cloned into every request.
///
/// Collaborators whose secrets are not configured are `None`; the handlers
/// that need them answer `MISSING_CONFIGURATION`.
#[derive(Clone)]
pub struct EdgeState {
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub sessions: Option<SessionVerifier>,
    pub signer: Option<Arc<dyn ObjectSigner>>,
    pub clock: Arc<dyn Clock>,
    pub queries: QueryClient,
    /// Options for idempotent gateway reads. Never cached: payment status
    /// must be current.
    pub payment_reads: QueryOptions,
    pub upstream_timeout: Duration,
    pub started_at: Instant,
}

impl EdgeState {
    /// State with no collaborators configured.
    pub fn new(queries: QueryClient) -> Self {
        let upstream_timeout = Duration::from_secs(PAYMENT_UPSTREAM_TIMEOUT_SECS);
        Self {
            gateway: None,
            sessions: None,
            signer: None,
            clock: Arc::new(SystemClock),
            queries,
            payment_reads: QueryOptions::new()
                .with_timeout(upstream_timeout)
                .with_retries(PAYMENT_READ_RETRIES)
                .with_cache(false),
            upstream_timeout,
            started_at: Instant::now(),
        }
    }

    /// Build state from configuration, wiring every collaborator whose
    /// settings are present.
    pub fn from_config(config: &EdgeConfig) -> ApiResult<Self> {
        let mut state = Self::new(QueryClient::new(config.query.clone()));

        if let Some(secret) = &config.moneroo_secret {
            let gateway = MonerooGateway::new(
                config.moneroo_api_url.clone(),
                secret.clone(),
                state.upstream_timeout,
            )?;
            state.gateway = Some(Arc::new(gateway));
        } else {
            tracing::warn!("MONEROO_SECRET_KEY not set; payment relay disabled");
        }

        if let Some(secret) = &config.jwt_secret {
            state.sessions = Some(SessionVerifier::new(secret.clone(), Arc::clone(&state.clock)));
        } else {
            tracing::warn!("SUPABASE_JWT_SECRET not set; payment relay and download signing disabled");
        }

        match (&config.supabase_service_key, &config.supabase_url) {
            (Some(key), Some(base)) => {
                let signer = StorageSigner::new(base.clone(), key.clone(), state.upstream_timeout)?;
                state.signer = Some(Arc::new(signer));
            }
            _ => tracing::warn!(
                "SUPABASE_SERVICE_ROLE_KEY or SUPABASE_URL not set; download signing disabled"
            ),
        }

        Ok(state)
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_sessions(mut self, sessions: SessionVerifier) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn ObjectSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_payment_reads(mut self, options: QueryOptions) -> Self {
        self.payment_reads = options;
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }
}
