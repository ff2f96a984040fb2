//! Shared fixtures for edge router tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use payhuk_core::{BackoffPolicy, QueryError, QueryResult};
use payhuk_edge::{
    create_router, EdgeConfig, EdgeState, FixedClock, GatewayCall, GatewayResponse,
    ObjectSigner, PaymentGateway, SessionClaims, SessionVerifier,
};
use payhuk_query::{QueryClient, QueryConfig};
use secrecy::SecretString;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const NOW: i64 = 1_704_067_200;
pub const JWT_SECRET: &str = "edge-test-jwt-secret";
pub const STORAGE_BASE: &str = "https://project.supabase.co";

/// Gateway that replays scripted answers and records every call.
#[derive(Default)]
pub struct ScriptedGateway {
    answers: Mutex<VecDeque<QueryResult<GatewayResponse>>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, status: u16, body: serde_json::Value) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(Ok(GatewayResponse { status, body }));
        self
    }

    pub fn fail(self, error: QueryError) -> Self {
        self.answers.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn send(&self, call: &GatewayCall) -> QueryResult<GatewayResponse> {
        self.calls.lock().unwrap().push(call.clone());
        let next = self.answers.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(QueryError::upstream("no scripted answer")))
    }
}

/// Gateway that never answers.
pub struct HangingGateway;

#[async_trait]
impl PaymentGateway for HangingGateway {
    async fn send(&self, _call: &GatewayCall) -> QueryResult<GatewayResponse> {
        std::future::pending().await
    }
}

/// Object signer that answers like the storage API and records requests.
#[derive(Default)]
pub struct StubSigner {
    failure: Option<QueryError>,
    requests: Mutex<Vec<(String, String, i64)>>,
}

impl StubSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: QueryError) -> Self {
        Self {
            failure: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, String, i64)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectSigner for StubSigner {
    async fn sign(&self, bucket: &str, path: &str, expires_in_secs: i64) -> QueryResult<String> {
        self.requests
            .lock()
            .unwrap()
            .push((bucket.to_string(), path.to_string(), expires_in_secs));
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(format!(
                "{}/storage/v1/object/sign/{}/{}?token=storage-token",
                STORAGE_BASE, bucket, path
            )),
        }
    }
}

/// State with every collaborator wired to test doubles and no backoff delay.
pub fn full_state(gateway: Arc<dyn PaymentGateway>) -> EdgeState {
    full_state_with_signer(gateway, Arc::new(StubSigner::new()))
}

pub fn full_state_with_signer(
    gateway: Arc<dyn PaymentGateway>,
    signer: Arc<dyn ObjectSigner>,
) -> EdgeState {
    let clock = Arc::new(FixedClock(NOW));
    let queries = QueryClient::new(QueryConfig::new().with_backoff(BackoffPolicy::immediate()));
    EdgeState::new(queries)
        .with_clock(clock.clone())
        .with_gateway(gateway)
        .with_sessions(SessionVerifier::new(
            SecretString::new(JWT_SECRET.into()),
            clock,
        ))
        .with_signer(signer)
}

pub fn app(state: EdgeState) -> Router {
    create_router(state, &EdgeConfig::default())
}

pub fn session_token(secret: &str, exp: i64) -> String {
    let claims = SessionClaims {
        sub: "buyer-1".to_string(),
        exp,
        role: Some("authenticated".to_string()),
        email: Some("buyer@example.com".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// A session valid at [`NOW`] for the configured secret.
pub fn valid_session() -> String {
    session_token(JWT_SECRET, NOW + 3600)
}

/// POST `body` as a signed-in user.
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    post_json_as(uri, body, Some(&valid_session()))
}

/// POST `body` with the given bearer token, or none.
pub fn post_json_as(uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", "https://shop.payhuk.com");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
