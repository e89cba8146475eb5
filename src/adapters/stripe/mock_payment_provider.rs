//! Mock payment provider for testing.
//!
//! Serves pre-configured subscriptions, supports error injection, and records
//! every lookup so tests can assert on provider round trips.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{PaymentError, PaymentProvider, ProviderSubscription};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.add_subscription(ProviderSubscription { id: "sub_1".into(), ... });
/// mock.set_error(PaymentError::network("connection reset"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Pre-configured subscriptions by ID.
    subscriptions: HashMap<String, ProviderSubscription>,

    /// Error to return on every call while set.
    error: Option<PaymentError>,

    /// Subscription IDs requested, in order.
    call_log: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add a subscription to the "provider".
    pub fn add_subscription(&self, subscription: ProviderSubscription) {
        self.state()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    /// Fail every call with this error until cleared.
    pub fn set_error(&self, error: PaymentError) {
        self.state().error = Some(error);
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Subscription IDs looked up so far.
    pub fn calls(&self) -> Vec<String> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, PaymentError> {
        let mut state = self.state();
        state.call_log.push(subscription_id.to_string());

        if let Some(error) = state.error.clone() {
            return Err(error);
        }

        state
            .subscriptions
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Subscription"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PaymentErrorCode;

    fn subscription(id: &str) -> ProviderSubscription {
        ProviderSubscription {
            id: id.to_string(),
            customer_id: "cus_1".to_string(),
            status: "active".to_string(),
            price_id: Some("price_x".to_string()),
            current_period_start: Some(1_700_000_000),
            current_period_end: Some(1_702_592_000),
        }
    }

    #[tokio::test]
    async fn returns_configured_subscription() {
        let mock = MockPaymentProvider::new();
        mock.add_subscription(subscription("sub_1"));

        let result = mock.retrieve_subscription("sub_1").await.unwrap();

        assert_eq!(result, subscription("sub_1"));
        assert_eq!(mock.calls(), vec!["sub_1".to_string()]);
    }

    #[tokio::test]
    async fn unknown_subscription_is_not_found() {
        let mock = MockPaymentProvider::new();

        let err = mock.retrieve_subscription("sub_nope").await.unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::NotFound);
    }

    #[tokio::test]
    async fn injected_error_wins_until_cleared() {
        let mock = MockPaymentProvider::new();
        mock.add_subscription(subscription("sub_1"));
        mock.set_error(PaymentError::network("connection reset"));

        assert!(mock.retrieve_subscription("sub_1").await.is_err());

        mock.clear_error();
        assert!(mock.retrieve_subscription("sub_1").await.is_ok());
        assert_eq!(mock.call_count(), 2);
    }
}
