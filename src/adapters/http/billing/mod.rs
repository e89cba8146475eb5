//! Billing HTTP adapter.
//!
//! Exposes the Stripe webhook receiver and the premium status query.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, PremiumStatusResponse, WebhookAckResponse};
pub use handlers::{
    health, BillingAppState, PremiumApiError, StripeCustomer, WebhookApiError,
    CUSTOMER_ID_HEADER, STRIPE_SIGNATURE_HEADER,
};
pub use routes::{billing_router, premium_routes, webhook_routes};
