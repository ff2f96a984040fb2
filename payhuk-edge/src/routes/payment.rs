//! `POST /functions/moneroo`: payment gateway relay.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use payhuk_core::QueryKey;
use payhuk_query::race_timeout;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::bearer_token;
use crate::error::{ApiError, ApiResult};
use crate::gateway::PaymentAction;
use crate::state::EdgeState;

/// Relay request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayRequest {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

/// Forward one action to the payment gateway on behalf of a signed-in user.
///
/// Reads (`get_payment`, `verify_payment`) go through the query layer and
/// are retried on transport failure; writes get exactly one attempt. The
/// gateway's status and JSON body are passed through unchanged.
pub async fn relay(
    State(state): State<EdgeState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let gateway = state
        .gateway
        .clone()
        .ok_or_else(|| ApiError::missing_configuration("MONEROO_SECRET_KEY"))?;
    let sessions = state
        .sessions
        .as_ref()
        .ok_or_else(|| ApiError::missing_configuration("SUPABASE_JWT_SECRET"))?;

    let claims = sessions.verify(bearer_token(&headers)?)?;

    let request: RelayRequest = serde_json::from_slice(&body)?;
    let action: PaymentAction = request.action.parse()?;
    let call = action.to_call(&request.data)?;

    tracing::info!(
        user = %claims.sub,
        action = %action,
        path = %call.path,
        "Relaying payment request"
    );

    let response = if action.is_read_only() {
        let key = QueryKey::new(format!("moneroo:{}", call.path));
        state
            .queries
            .execute(&key, &state.payment_reads, || gateway.send(&call))
            .await?
            .into_value()
    } else {
        race_timeout(state.upstream_timeout, gateway.send(&call)).await?
    };

    if response.status >= 400 {
        tracing::warn!(action = %action, status = response.status, "Gateway rejected request");
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(response.body)).into_response())
}
