//! Short-lived signed download URLs.
//!
//! URLs are minted by the storage backend itself
//! (`POST {base}/storage/v1/object/sign/{bucket}/{path}`) using the service
//! key, so the token in the URL is one the storage API accepts. The edge
//! service only decides who may ask and for which object.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use payhuk_core::{QueryError, QueryResult};
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// A signed URL and the instant it stops working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrl {
    pub signed_url: String,
    pub expires_at: DateTime<Utc>,
}

impl SignedUrl {
    /// Pair a minted URL with its expiry, `ttl_secs` after `now`.
    pub fn expiring(signed_url: String, now: i64, ttl_secs: i64) -> ApiResult<Self> {
        let expires_at = DateTime::from_timestamp(now + ttl_secs, 0)
            .ok_or_else(|| ApiError::internal_error("Expiry is out of range"))?;
        Ok(Self {
            signed_url,
            expires_at,
        })
    }
}

/// Something that can mint a time-limited read URL for one object.
#[async_trait]
pub trait ObjectSigner: Send + Sync {
    /// Absolute URL granting read access to `bucket/path` for `expires_in_secs`.
    async fn sign(&self, bucket: &str, path: &str, expires_in_secs: i64) -> QueryResult<String>;
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// [`ObjectSigner`] backed by the storage API's sign endpoint.
pub struct StorageSigner {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
    timeout: Duration,
}

impl fmt::Debug for StorageSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSigner")
            .field("base_url", &self.base_url)
            .field("service_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorageSigner {
    pub fn new(
        base_url: impl Into<String>,
        service_key: SecretString,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::internal_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sign endpoint for one object. Path segments are percent-encoded.
    pub fn sign_endpoint(&self, bucket: &str, path: &str) -> String {
        let encoded_path = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            encoded_path
        )
    }

    /// The storage API answers with a URL relative to `/storage/v1`.
    fn absolute(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            signed.to_string()
        } else if signed.starts_with('/') {
            format!("{}/storage/v1{}", self.base_url, signed)
        } else {
            format!("{}/storage/v1/{}", self.base_url, signed)
        }
    }
}

#[async_trait]
impl ObjectSigner for StorageSigner {
    async fn sign(&self, bucket: &str, path: &str, expires_in_secs: i64) -> QueryResult<String> {
        let key = self.service_key.expose_secret();
        let response = self
            .client
            .post(self.sign_endpoint(bucket, path))
            .header("apikey", key)
            .bearer_auth(key)
            .header(ACCEPT, "application/json")
            .json(&json!({ "expiresIn": expires_in_secs }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::Timeout {
                        limit: self.timeout,
                    }
                } else {
                    QueryError::upstream(format!("Storage sign request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(bucket, status = status.as_u16(), "Storage refused to sign object");
            return Err(QueryError::upstream_status(status.as_u16(), body));
        }

        let body: SignResponse = response.json().await.map_err(|e| QueryError::Decode {
            reason: format!("Invalid sign response: {}", e),
        })?;

        Ok(self.absolute(&body.signed_url))
    }
}

/// Reject bucket and path values that could address anything but one object.
pub fn validate_object(bucket: &str, path: &str) -> ApiResult<()> {
    if bucket.trim().is_empty() {
        return Err(ApiError::missing_field("bucket"));
    }
    if bucket.contains('/') {
        return Err(ApiError::invalid_input("Bucket name must not contain '/'"));
    }
    if path.trim().is_empty() {
        return Err(ApiError::missing_field("path"));
    }
    if path.starts_with('/') {
        return Err(ApiError::invalid_input("Object path must be relative"));
    }
    if path.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(ApiError::invalid_input(
            "Object path must not contain empty or '..' segments",
        ));
    }
    Ok(())
}
