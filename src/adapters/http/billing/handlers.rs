//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to the application layer.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler,
};
use crate::domain::foundation::DomainError;
use crate::domain::subscription::WebhookError;
use crate::ports::PremiumGate;

use super::dto::{ErrorResponse, PremiumStatusResponse, WebhookAckResponse};

/// Header carrying the Stripe signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Header identifying the customer for premium checks.
pub const CUSTOMER_ID_HEADER: &str = "X-Stripe-Customer-Id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct BillingAppState {
    pub webhook_handler: Arc<HandleStripeWebhookHandler>,
    pub premium_gate: Arc<dyn PremiumGate>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Customer Context
// ════════════════════════════════════════════════════════════════════════════════

/// Customer identified by the `X-Stripe-Customer-Id` header.
///
/// Session authentication happens upstream; this service only needs the
/// customer the session resolved to.
#[derive(Debug, Clone)]
pub struct StripeCustomer {
    pub customer_id: String,
}

/// Rejection type for StripeCustomer extraction.
pub struct CustomerRequired;

impl IntoResponse for CustomerRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("CUSTOMER_REQUIRED", "Missing X-Stripe-Customer-Id header");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for StripeCustomer
where
    S: Send + Sync,
{
    type Rejection = CustomerRequired;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let customer_id = parts
            .headers
            .get(CUSTOMER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(CustomerRequired)?;

        Ok(StripeCustomer {
            customer_id: customer_id.to_string(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Handle Stripe webhook events
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleStripeWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    state.webhook_handler.handle(cmd).await?;

    Ok(Json(WebhookAckResponse::received()))
}

/// GET /api/premium/status - Premium status for the calling customer
pub async fn get_premium_status(
    State(state): State<BillingAppState>,
    customer: StripeCustomer,
) -> Result<impl IntoResponse, PremiumApiError> {
    let is_premium = state
        .premium_gate
        .has_premium_access(&customer.customer_id)
        .await?;

    Ok(Json(PremiumStatusResponse {
        customer_id: customer.customer_id,
        is_premium,
    }))
}

/// GET /health - Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let code = match &self.0 {
            WebhookError::MissingConfiguration(_) => "MISSING_CONFIGURATION",
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::MalformedSignature(_) | WebhookError::InvalidSignature => {
                "INVALID_SIGNATURE"
            }
            WebhookError::TimestampOutOfRange | WebhookError::InvalidTimestamp => {
                "INVALID_TIMESTAMP"
            }
            WebhookError::LivemodeRequired => "LIVEMODE_REQUIRED",
            WebhookError::ParseError(_) => "INVALID_PAYLOAD",
            WebhookError::InvalidPayload(_) | WebhookError::Store(_) | WebhookError::Provider(_) => {
                "INTERNAL_ERROR"
            }
        };

        let status = self.0.status_code();
        let body = ErrorResponse::new(code, self.0.to_string());
        (status, Json(body)).into_response()
    }
}

/// API error type for the premium status endpoint.
#[derive(Debug)]
pub struct PremiumApiError(DomainError);

impl From<DomainError> for PremiumApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PremiumApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self.0, "Premium status lookup failed");
        let body = ErrorResponse::new(self.0.code.to_string(), "Failed to read subscription status");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
