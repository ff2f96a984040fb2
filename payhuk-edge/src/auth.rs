//! Session verification for protected edge functions.
//!
//! Sessions are HS256 JWTs issued by the backend's auth service. Signature
//! checking is delegated to `jsonwebtoken`; expiry is checked here against an
//! injected [`Clock`] so tests are deterministic.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::SESSION_LEEWAY_SECS;
use crate::error::{ApiError, ApiResult};

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Source of the current time, in Unix epoch seconds.
pub trait Clock: Send + Sync {
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// SESSION CLAIMS
// ============================================================================

/// Claims carried by a user session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ============================================================================
// VERIFIER
// ============================================================================

/// Validates session tokens against the shared HS256 secret.
#[derive(Clone)]
pub struct SessionVerifier {
    secret: SecretString,
    clock: Arc<dyn Clock>,
    leeway_secs: i64,
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("secret", &"[REDACTED]")
            .field("clock", &"<Clock>")
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl SessionVerifier {
    pub fn new(secret: SecretString, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret,
            clock,
            leeway_secs: SESSION_LEEWAY_SECS,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// * `InvalidToken` - malformed token, wrong signature or missing `exp`
    /// * `TokenExpired` - `exp` is further in the past than the leeway allows
    pub fn verify(&self, token: &str) -> ApiResult<SessionClaims> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        // Session tokens carry `aud: authenticated`; the secret already scopes them.
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => ApiError::invalid_token("Token signature is invalid"),
            ErrorKind::InvalidToken => ApiError::invalid_token("Token is invalid"),
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

        let now = self.clock.now_epoch_secs();
        if data.claims.exp < now - self.leeway_secs {
            return Err(ApiError::token_expired());
        }

        Ok(data.claims)
    }
}

/// Extract the bearer token from an `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> ApiResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Authorization header is not valid text"))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(ApiError::unauthenticated(
            "Authorization header must use the Bearer scheme",
        )),
    }
}
