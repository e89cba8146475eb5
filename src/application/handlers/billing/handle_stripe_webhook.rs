//! HandleStripeWebhookHandler - Command handler for Stripe webhook deliveries.
//!
//! Order of checks: configuration, signature presence, signature validity,
//! event decoding, then reconciliation. Everything up to decoding can reject
//! the delivery. Reconciliation failures are logged and acknowledged so the
//! provider does not retry into the same failure.

use std::sync::Arc;

use crate::domain::subscription::{BillingEvent, StripeWebhookVerifier, WebhookError};
use crate::ports::{PaymentProvider, SubscriptionStore};

use super::reconcile_subscription::{ReconcileOutcome, SubscriptionReconciler};

/// Setting names reported when a secret is absent.
pub const WEBHOOK_SECRET_SETTING: &str = "payment.stripe_webhook_secret";
pub const API_KEY_SETTING: &str = "payment.stripe_api_key";

/// Command to handle one webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Value of the `Stripe-Signature` header, if present.
    pub signature: Option<String>,
}

/// How an acknowledged delivery was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookDisposition {
    Reconciled(ReconcileOutcome),
    /// Reconciliation failed; acknowledged anyway.
    ReconciliationFailed { error: String },
}

/// Result of an acknowledged delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleStripeWebhookResult {
    pub event_id: String,
    pub event_type: String,
    pub disposition: WebhookDisposition,
}

/// Handler for Stripe webhook deliveries.
///
/// Both the verifier and the payment provider are optional so a deployment
/// with missing secrets still starts; such deliveries fail with
/// `MissingConfiguration`.
pub struct HandleStripeWebhookHandler {
    verifier: Option<StripeWebhookVerifier>,
    reconciler: Option<SubscriptionReconciler>,
}

impl HandleStripeWebhookHandler {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        payment_provider: Option<Arc<dyn PaymentProvider>>,
        verifier: Option<StripeWebhookVerifier>,
    ) -> Self {
        Self {
            verifier,
            reconciler: payment_provider
                .map(|provider| SubscriptionReconciler::new(store, provider)),
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<HandleStripeWebhookResult, WebhookError> {
        // 1. Configuration
        let reconciler = self
            .reconciler
            .as_ref()
            .ok_or(WebhookError::MissingConfiguration(API_KEY_SETTING))?;
        let verifier = self
            .verifier
            .as_ref()
            .ok_or(WebhookError::MissingConfiguration(WEBHOOK_SECRET_SETTING))?;

        // 2. Signature presence
        let signature = cmd
            .signature
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        // 3. Verification
        let event = verifier
            .verify_and_parse(&cmd.payload, signature)
            .map_err(|e| {
                if e.is_security_rejection() {
                    tracing::warn!(target: "security", error = %e, "Webhook signature rejected");
                } else {
                    tracing::warn!(error = %e, "Webhook rejected");
                }
                e
            })?;

        // 4. Decode
        let billing_event = BillingEvent::from_event(&event).map_err(|e| {
            tracing::warn!(event_id = %event.id, event_type = %event.event_type, error = %e, "Webhook payload rejected");
            e
        })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Processing Stripe webhook"
        );

        // 5. Reconcile
        let disposition = match reconciler.apply(&billing_event).await {
            Ok(outcome) => WebhookDisposition::Reconciled(outcome),
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "Webhook reconciliation failed; acknowledging for manual follow-up"
                );
                WebhookDisposition::ReconciliationFailed {
                    error: e.to_string(),
                }
            }
        };

        Ok(HandleStripeWebhookResult {
            event_id: event.id,
            event_type: event.event_type,
            disposition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::subscription::compute_test_signature;
    use crate::ports::{ProviderSubscription, WriteOutcome};
    use secrecy::SecretString;
    use serde_json::json;

    const SECRET: &str = "whsec_handler_test";

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    fn provider() -> MockPaymentProvider {
        let provider = MockPaymentProvider::new();
        provider.add_subscription(ProviderSubscription {
            id: "sub_1".to_string(),
            customer_id: "cus_1".to_string(),
            status: "active".to_string(),
            price_id: Some("price_x".to_string()),
            current_period_start: Some(1_700_000_000),
            current_period_end: Some(1_702_592_000),
        });
        provider
    }

    fn verifier() -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(SecretString::new(SECRET.to_string()))
    }

    fn handler(store: &Arc<InMemorySubscriptionStore>) -> HandleStripeWebhookHandler {
        HandleStripeWebhookHandler::new(
            store.clone(),
            Some(Arc::new(provider()) as Arc<dyn PaymentProvider>),
            Some(verifier()),
        )
    }

    fn payload(event_type: &str, object: serde_json::Value) -> String {
        json!({
            "id": "evt_1",
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "data": {"object": object},
            "livemode": false
        })
        .to_string()
    }

    fn signed(payload: &str) -> HandleStripeWebhookCommand {
        let ts = chrono::Utc::now().timestamp();
        HandleStripeWebhookCommand {
            payload: payload.as_bytes().to_vec(),
            signature: Some(format!(
                "t={},v1={}",
                ts,
                compute_test_signature(SECRET, ts, payload)
            )),
        }
    }

    fn checkout_payload() -> String {
        payload(
            "checkout.session.completed",
            json!({
                "id": "cs_1",
                "customer": "cus_1",
                "subscription": "sub_1",
                "customer_details": {"email": "a@b.com"}
            }),
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Acknowledged deliveries
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_checkout_is_reconciled() {
        let store = Arc::new(InMemorySubscriptionStore::new());

        let result = handler(&store).handle(signed(&checkout_payload())).await.unwrap();

        assert_eq!(result.event_id, "evt_1");
        assert_eq!(result.event_type, "checkout.session.completed");
        assert_eq!(
            result.disposition,
            WebhookDisposition::Reconciled(ReconcileOutcome::Applied(WriteOutcome::Inserted))
        );
        assert!(store.find_by_customer_id("cus_1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_event_is_acknowledged_without_writes() {
        let store = Arc::new(InMemorySubscriptionStore::new());

        let result = handler(&store)
            .handle(signed(&payload("some.future.event", json!({"id": "x"}))))
            .await
            .unwrap();

        assert_eq!(
            result.disposition,
            WebhookDisposition::Reconciled(ReconcileOutcome::Ignored)
        );
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_still_acknowledged() {
        let store = Arc::new(InMemorySubscriptionStore::new());
        store.fail_writes(true);

        let result = handler(&store).handle(signed(&checkout_payload())).await.unwrap();

        assert!(matches!(
            result.disposition,
            WebhookDisposition::ReconciliationFailed { .. }
        ));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_webhook_secret_is_configuration_error() {
        let store = Arc::new(InMemorySubscriptionStore::new());
        let handler = HandleStripeWebhookHandler::new(
            store.clone(),
            Some(Arc::new(provider()) as Arc<dyn PaymentProvider>),
            None,
        );

        let err = handler.handle(signed(&checkout_payload())).await.unwrap_err();

        assert!(matches!(
            err,
            WebhookError::MissingConfiguration(WEBHOOK_SECRET_SETTING)
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn missing_api_key_is_checked_before_signature() {
        let store = Arc::new(InMemorySubscriptionStore::new());
        let handler = HandleStripeWebhookHandler::new(store.clone(), None, Some(verifier()));
        let cmd = HandleStripeWebhookCommand {
            payload: b"{}".to_vec(),
            signature: None,
        };

        let err = handler.handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::MissingConfiguration(API_KEY_SETTING)));
    }

    #[tokio::test]
    async fn missing_or_empty_signature_is_rejected() {
        let store = Arc::new(InMemorySubscriptionStore::new());

        for signature in [None, Some(String::new())] {
            let cmd = HandleStripeWebhookCommand {
                payload: checkout_payload().into_bytes(),
                signature,
            };
            let err = handler(&store).handle(cmd).await.unwrap_err();
            assert!(matches!(err, WebhookError::MissingSignature));
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn forged_signature_is_rejected_without_writes() {
        let store = Arc::new(InMemorySubscriptionStore::new());
        let mut cmd = signed(&checkout_payload());
        cmd.payload = checkout_payload().replace("cus_1", "cus_2").into_bytes();

        let err = handler(&store).handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn known_type_with_bad_object_is_parse_error() {
        let store = Arc::new(InMemorySubscriptionStore::new());

        let err = handler(&store)
            .handle(signed(&payload("customer.subscription.updated", json!({"id": "sub_1"}))))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::ParseError(_)));
        assert_eq!(store.write_count(), 0);
    }
}
