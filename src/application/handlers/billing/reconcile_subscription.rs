//! SubscriptionReconciler - Applies a verified billing event to the store.
//!
//! One event maps to at most one store write (checkout completion adds one
//! provider lookup first). Events missing the identifiers they need are
//! skipped rather than failed.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{
    BillingEvent, CheckoutSessionObject, Expandable, InvoiceObject, PaymentIntentObject,
    SubscriptionObject, SubscriptionPatch, SubscriptionSnapshot, SubscriptionStatus,
    WebhookError,
};
use crate::ports::{PaymentProvider, SubscriptionStore, WriteOutcome};

/// What reconciling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A store write was issued.
    Applied(WriteOutcome),
    /// A precondition was not met; nothing was written.
    Skipped { reason: &'static str },
    /// Event type is not one we reconcile.
    Ignored,
}

/// Maps billing events to subscription store writes.
pub struct SubscriptionReconciler {
    store: Arc<dyn SubscriptionStore>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl SubscriptionReconciler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            store,
            payment_provider,
        }
    }

    /// Applies the event.
    ///
    /// # Errors
    ///
    /// - `Provider` if the subscription lookup fails
    /// - `Store` if the write fails
    /// - `InvalidPayload` for unknown provider statuses or out-of-range periods
    pub async fn apply(&self, event: &BillingEvent) -> Result<ReconcileOutcome, WebhookError> {
        tracing::debug!(event_type = event.kind(), "Applying billing event");

        match event {
            BillingEvent::CheckoutSessionCompleted(session) => {
                self.checkout_completed(session).await
            }
            BillingEvent::PaymentIntentSucceeded(intent) => {
                self.payment_intent(intent, SubscriptionStatus::Active, true)
                    .await
            }
            BillingEvent::PaymentIntentFailed(intent) => {
                self.payment_intent(intent, SubscriptionStatus::PastDue, false)
                    .await
            }
            BillingEvent::SubscriptionCreated(sub) => self.subscription_created(sub).await,
            BillingEvent::SubscriptionUpdated(sub) => self.subscription_updated(sub).await,
            BillingEvent::SubscriptionDeleted(sub) => self.subscription_deleted(sub).await,
            BillingEvent::InvoicePaymentSucceeded(invoice) => self.invoice_paid(invoice).await,
            BillingEvent::Unhandled(_) => {
                tracing::info!(event_type = event.kind(), "Unhandled event type");
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }

    async fn checkout_completed(
        &self,
        session: &CheckoutSessionObject,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let (Some(customer), Some(subscription), Some(_email)) = (
            session.customer.as_ref(),
            session.subscription.as_ref(),
            session.customer_email(),
        ) else {
            return Ok(skipped(
                "checkout session missing customer, subscription or email",
            ));
        };

        let provider_sub = self
            .payment_provider
            .retrieve_subscription(subscription.id())
            .await?;

        let snapshot = SubscriptionSnapshot {
            stripe_customer_id: customer.id().to_string(),
            stripe_subscription_id: Some(subscription.id().to_string()),
            stripe_payment_intent_id: session.payment_intent.as_ref().map(|p| p.id().to_string()),
            status: map_status(&provider_sub.status)?,
            price_id: provider_sub.price_id,
            current_period_start: to_timestamp(provider_sub.current_period_start)?,
            current_period_end: to_timestamp(provider_sub.current_period_end)?,
        };

        let outcome = self.store.upsert_by_customer_id(&snapshot).await?;
        tracing::info!(
            customer_id = %snapshot.stripe_customer_id,
            subscription_id = %subscription.id(),
            status = %snapshot.status,
            "Subscription upserted from checkout"
        );
        Ok(ReconcileOutcome::Applied(outcome))
    }

    async fn payment_intent(
        &self,
        intent: &PaymentIntentObject,
        status: SubscriptionStatus,
        record_intent: bool,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let Some(customer) = intent.customer.as_ref().map(Expandable::id) else {
            return Ok(skipped("payment intent has no customer"));
        };

        let mut patch = SubscriptionPatch::status(status);
        if record_intent {
            patch = patch.with_payment_intent(intent.id.clone());
        }

        let outcome = self.store.update_by_customer_id(customer, &patch).await?;
        log_update(&outcome, "customer_id", customer, status);
        Ok(ReconcileOutcome::Applied(outcome))
    }

    async fn subscription_created(
        &self,
        sub: &SubscriptionObject,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let snapshot = SubscriptionSnapshot {
            stripe_customer_id: sub.customer.id().to_string(),
            stripe_subscription_id: Some(sub.id.clone()),
            stripe_payment_intent_id: None,
            status: map_status(&sub.status)?,
            price_id: sub.price_id().map(str::to_string),
            current_period_start: to_timestamp(sub.period_start())?,
            current_period_end: to_timestamp(sub.period_end())?,
        };

        let outcome = self.store.insert(&snapshot).await?;
        if outcome == WriteOutcome::AlreadyPresent {
            tracing::debug!(
                customer_id = %snapshot.stripe_customer_id,
                subscription_id = %sub.id,
                "Subscription record already present; insert skipped"
            );
        }
        Ok(ReconcileOutcome::Applied(outcome))
    }

    async fn subscription_updated(
        &self,
        sub: &SubscriptionObject,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let status = map_status(&sub.status)?;
        let patch = SubscriptionPatch::status(status)
            .with_price(sub.price_id().map(str::to_string))
            .with_period(to_timestamp(sub.period_start())?, to_timestamp(sub.period_end())?);

        let outcome = self.store.update_by_subscription_id(&sub.id, &patch).await?;
        log_update(&outcome, "subscription_id", &sub.id, status);
        Ok(ReconcileOutcome::Applied(outcome))
    }

    async fn subscription_deleted(
        &self,
        sub: &SubscriptionObject,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let status = SubscriptionStatus::Canceled;
        let outcome = self
            .store
            .update_by_subscription_id(&sub.id, &SubscriptionPatch::status(status))
            .await?;
        log_update(&outcome, "subscription_id", &sub.id, status);
        Ok(ReconcileOutcome::Applied(outcome))
    }

    async fn invoice_paid(&self, invoice: &InvoiceObject) -> Result<ReconcileOutcome, WebhookError> {
        let Some(subscription_id) = invoice.subscription_id() else {
            return Ok(skipped("invoice is not tied to a subscription"));
        };

        let status = SubscriptionStatus::Active;
        let outcome = self
            .store
            .update_by_subscription_id(subscription_id, &SubscriptionPatch::status(status))
            .await?;
        log_update(&outcome, "subscription_id", subscription_id, status);
        Ok(ReconcileOutcome::Applied(outcome))
    }
}

fn skipped(reason: &'static str) -> ReconcileOutcome {
    tracing::info!(reason, "Event skipped");
    ReconcileOutcome::Skipped { reason }
}

fn log_update(outcome: &WriteOutcome, key: &str, value: &str, status: SubscriptionStatus) {
    if outcome.wrote() {
        tracing::info!(key, value, status = %status, "Subscription updated");
    } else {
        tracing::debug!(key, value, status = %status, "No subscription record matched");
    }
}

fn map_status(provider_status: &str) -> Result<SubscriptionStatus, WebhookError> {
    SubscriptionStatus::from_provider(provider_status).ok_or_else(|| {
        WebhookError::InvalidPayload(format!(
            "unsupported subscription status: {}",
            provider_status
        ))
    })
}

fn to_timestamp(secs: Option<i64>) -> Result<Option<Timestamp>, WebhookError> {
    secs.map(|s| {
        Timestamp::from_unix_secs(s)
            .ok_or_else(|| WebhookError::InvalidPayload(format!("timestamp out of range: {}", s)))
    })
    .transpose()
}
