//! Billing handlers: webhook intake, reconciliation, premium access.

mod check_premium_access;
mod handle_stripe_webhook;
mod reconcile_subscription;

pub use check_premium_access::SubscriptionPremiumGate;
pub use handle_stripe_webhook::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler, HandleStripeWebhookResult,
    WebhookDisposition, API_KEY_SETTING, WEBHOOK_SECRET_SETTING,
};
pub use reconcile_subscription::{ReconcileOutcome, SubscriptionReconciler};
