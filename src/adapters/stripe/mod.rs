//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe: subscription lookups
//! over the REST API, plus an in-process mock for tests.
//!
//! Webhook signature verification lives in the domain
//! (`StripeWebhookVerifier`), since it has no I/O.

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use api_types::{StripeApiError, StripeErrorResponse};
pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{
    StripeConfig, StripePaymentAdapter, DEFAULT_API_BASE_URL, DEFAULT_API_VERSION,
};
