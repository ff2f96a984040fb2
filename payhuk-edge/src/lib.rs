//! Payhuk Edge - HTTP Edge Functions
//!
//! Server-side endpoints the storefront cannot implement in the browser
//! because they need secrets:
//!
//! - payment relay: forwards a signed-in user's `{action, data}` to the
//!   payment gateway
//! - download signer: obtains short-lived storage URLs for signed-in users
//!
//! Gateway reads go through the `payhuk-query` retry and timeout pipeline.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod signer;
pub mod state;
pub mod telemetry;

pub use auth::{Clock, FixedClock, SessionClaims, SessionVerifier, SystemClock};
pub use config::{EdgeConfig, LogFormat};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use gateway::{
    GatewayCall, GatewayMethod, GatewayResponse, MonerooGateway, PaymentAction, PaymentGateway,
};
pub use routes::create_router;
pub use signer::{validate_object, ObjectSigner, SignedUrl, StorageSigner};
pub use state::EdgeState;
