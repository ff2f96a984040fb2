//! `POST /functions/download-url`: signed URLs for purchased files.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use payhuk_query::race_timeout;
use serde::Deserialize;

use crate::auth::bearer_token;
use crate::constants::SIGNED_URL_TTL_SECS;
use crate::error::{ApiError, ApiResult};
use crate::signer::{validate_object, SignedUrl};
use crate::state::EdgeState;

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadRequest {
    pub bucket: Option<String>,
    pub path: Option<String>,
}

/// Issue a short-lived URL for one storage object to a signed-in user.
pub async fn create_download_url(
    State(state): State<EdgeState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<SignedUrl>> {
    let sessions = state
        .sessions
        .as_ref()
        .ok_or_else(|| ApiError::missing_configuration("SUPABASE_JWT_SECRET"))?;
    let signer = state
        .signer
        .clone()
        .ok_or_else(|| ApiError::missing_configuration("SUPABASE_SERVICE_ROLE_KEY"))?;

    let claims = sessions.verify(bearer_token(&headers)?)?;

    let request: DownloadRequest = serde_json::from_slice(&body)?;
    let bucket = request.bucket.ok_or_else(|| ApiError::missing_field("bucket"))?;
    let path = request.path.ok_or_else(|| ApiError::missing_field("path"))?;
    validate_object(&bucket, &path)?;

    let now = state.clock.now_epoch_secs();
    let url = race_timeout(
        state.upstream_timeout,
        signer.sign(&bucket, &path, SIGNED_URL_TTL_SECS),
    )
    .await?;
    let signed = SignedUrl::expiring(url, now, SIGNED_URL_TTL_SECS)?;

    tracing::info!(
        user = %claims.sub,
        bucket = %bucket,
        expires_at = %signed.expires_at,
        "Issued signed download URL"
    );

    Ok(Json(signed))
}
