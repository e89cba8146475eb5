//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_premium_status, handle_stripe_webhook, BillingAppState};

/// Create the Stripe webhook router.
///
/// Webhooks carry no user session; they are authenticated by signature.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the premium access router.
///
/// # Routes
/// - `GET /status` - Premium status for the `X-Stripe-Customer-Id` customer
pub fn premium_routes() -> Router<BillingAppState> {
    Router::new().route("/status", get(get_premium_status))
}

/// Create the complete billing router, suitable for mounting at `/api`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/webhooks", webhook_routes())
        .nest("/premium", premium_routes())
}
