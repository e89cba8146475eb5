//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod billing;

pub use billing::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler, HandleStripeWebhookResult,
    ReconcileOutcome, SubscriptionPremiumGate, SubscriptionReconciler, WebhookDisposition,
};
