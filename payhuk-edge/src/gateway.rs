//! Payment gateway relay.
//!
//! The storefront never holds the gateway secret. It posts `{action, data}`
//! to the edge service, which maps the action onto a fixed gateway endpoint
//! and forwards the call with the secret attached.

use async_trait::async_trait;
use payhuk_core::{QueryError, QueryResult};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// ACTIONS
// ============================================================================

/// Operations the relay is willing to forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentAction {
    CreatePayment,
    CreateCheckout,
    GetPayment,
    VerifyPayment,
}

impl PaymentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentAction::CreatePayment => "create_payment",
            PaymentAction::CreateCheckout => "create_checkout",
            PaymentAction::GetPayment => "get_payment",
            PaymentAction::VerifyPayment => "verify_payment",
        }
    }

    /// Whether the action only reads gateway state and may be retried.
    pub fn is_read_only(&self) -> bool {
        matches!(self, PaymentAction::GetPayment | PaymentAction::VerifyPayment)
    }

    /// Translate the action and its payload into a gateway call.
    pub fn to_call(&self, data: &Value) -> ApiResult<GatewayCall> {
        match self {
            PaymentAction::CreatePayment | PaymentAction::CreateCheckout => Ok(GatewayCall {
                method: GatewayMethod::Post,
                path: "/payments/initialize".to_string(),
                body: Some(data.clone()),
            }),
            PaymentAction::GetPayment => Ok(GatewayCall {
                method: GatewayMethod::Get,
                path: format!("/payments/{}", payment_id(data)?),
                body: None,
            }),
            PaymentAction::VerifyPayment => Ok(GatewayCall {
                method: GatewayMethod::Get,
                path: format!("/payments/{}/verify", payment_id(data)?),
                body: None,
            }),
        }
    }
}

impl FromStr for PaymentAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_payment" => Ok(PaymentAction::CreatePayment),
            "create_checkout" => Ok(PaymentAction::CreateCheckout),
            "get_payment" => Ok(PaymentAction::GetPayment),
            "verify_payment" => Ok(PaymentAction::VerifyPayment),
            other => Err(ApiError::unknown_action(other)),
        }
    }
}

impl fmt::Display for PaymentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn payment_id(data: &Value) -> ApiResult<String> {
    let id = data
        .get("paymentId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::missing_field("paymentId"))?;
    Ok(urlencoding::encode(id).into_owned())
}

// ============================================================================
// GATEWAY CALLS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMethod {
    Get,
    Post,
}

/// One request to send to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCall {
    pub method: GatewayMethod,
    /// Path relative to the gateway base URL.
    pub path: String,
    pub body: Option<Value>,
}

/// The gateway's answer, forwarded verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Value,
}

/// Transport to the payment gateway.
///
/// Any HTTP answer, including 4xx/5xx, is `Ok`: the relay forwards the
/// gateway's own status. `Err` means no usable answer arrived.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn send(&self, call: &GatewayCall) -> QueryResult<GatewayResponse>;
}

// ============================================================================
// MONEROO
// ============================================================================

/// [`PaymentGateway`] for the Moneroo REST API.
pub struct MonerooGateway {
    client: reqwest::Client,
    base_url: String,
    secret: SecretString,
    timeout: Duration,
}

impl fmt::Debug for MonerooGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonerooGateway")
            .field("base_url", &self.base_url)
            .field("secret", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MonerooGateway {
    pub fn new(
        base_url: impl Into<String>,
        secret: SecretString,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::internal_error(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PaymentGateway for MonerooGateway {
    async fn send(&self, call: &GatewayCall) -> QueryResult<GatewayResponse> {
        let url = format!("{}{}", self.base_url, call.path);
        let mut request = match call.method {
            GatewayMethod::Get => self.client.get(&url),
            GatewayMethod::Post => self.client.post(&url),
        }
        .bearer_auth(self.secret.expose_secret())
        .header(ACCEPT, "application/json");

        if let Some(body) = &call.body {
            request = request.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                QueryError::Timeout {
                    limit: self.timeout,
                }
            } else {
                QueryError::upstream(format!("Gateway request failed: {}", e))
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| QueryError::upstream(format!("Failed to read gateway response: {}", e)))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "message": text }))
        };

        tracing::debug!(path = %call.path, status, "Gateway answered");
        Ok(GatewayResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_action_parsing() {
        assert_eq!(
            "create_payment".parse::<PaymentAction>().unwrap(),
            PaymentAction::CreatePayment
        );
        assert_eq!(
            "verify_payment".parse::<PaymentAction>().unwrap(),
            PaymentAction::VerifyPayment
        );
        let err = "refund_payment".parse::<PaymentAction>().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownAction);
    }

    #[test]
    fn test_action_display_round_trips() {
        for action in [
            PaymentAction::CreatePayment,
            PaymentAction::CreateCheckout,
            PaymentAction::GetPayment,
            PaymentAction::VerifyPayment,
        ] {
            assert_eq!(action.to_string().parse::<PaymentAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_create_actions_post_to_initialize() {
        let data = json!({"amount": 5000, "currency": "XOF"});
        for action in [PaymentAction::CreatePayment, PaymentAction::CreateCheckout] {
            let call = action.to_call(&data).unwrap();
            assert_eq!(call.method, GatewayMethod::Post);
            assert_eq!(call.path, "/payments/initialize");
            assert_eq!(call.body, Some(data.clone()));
            assert!(!action.is_read_only());
        }
    }

    #[test]
    fn test_read_actions_use_payment_id() {
        let data = json!({"paymentId": "py_123"});
        let get = PaymentAction::GetPayment.to_call(&data).unwrap();
        assert_eq!(get.method, GatewayMethod::Get);
        assert_eq!(get.path, "/payments/py_123");
        assert!(get.body.is_none());

        let verify = PaymentAction::VerifyPayment.to_call(&data).unwrap();
        assert_eq!(verify.path, "/payments/py_123/verify");
        assert!(PaymentAction::VerifyPayment.is_read_only());
    }

    #[test]
    fn test_payment_id_is_required_and_escaped() {
        let err = PaymentAction::GetPayment.to_call(&json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);

        let err = PaymentAction::GetPayment
            .to_call(&json!({"paymentId": 42}))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);

        let call = PaymentAction::GetPayment
            .to_call(&json!({"paymentId": "../admin"}))
            .unwrap();
        assert_eq!(call.path, "/payments/..%2Fadmin");
    }

    #[test]
    fn test_gateway_debug_redacts_secret() {
        let gateway = MonerooGateway::new(
            "https://api.moneroo.io/v1/",
            SecretString::new("sk_live_secret".into()),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(gateway.base_url(), "https://api.moneroo.io/v1");
        assert!(!format!("{:?}", gateway).contains("sk_live_secret"));
    }
}
