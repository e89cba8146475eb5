//! Subscription domain module.
//!
//! Maps Stripe billing lifecycle events onto the locally stored subscription
//! record that gates premium features.
//!
//! # Module Structure
//!
//! - `status` - Local subscription status and provider status folding
//! - `record` - Stored record plus snapshot/patch write shapes
//! - `stripe_event` - Verified webhook envelope
//! - `billing_event` - Typed union of the event kinds we reconcile
//! - `webhook_verifier` - Stripe-Signature verification
//! - `webhook_errors` - Webhook error taxonomy

mod billing_event;
mod record;
mod status;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use billing_event::{
    BillingEvent, CheckoutSessionObject, CustomerDetails, Expandable, InvoiceObject,
    PaymentIntentObject, PriceRef, SubscriptionItem, SubscriptionItems, SubscriptionObject,
};
pub use record::{SubscriptionPatch, SubscriptionRecord, SubscriptionSnapshot};
pub use status::SubscriptionStatus;
pub use stripe_event::{StripeEvent, StripeEventData};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{
    SignatureHeader, StripeWebhookVerifier, MAX_CLOCK_SKEW_SECS, MAX_EVENT_AGE_SECS,
};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
