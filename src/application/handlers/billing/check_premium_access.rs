//! Premium access check backed by the subscription store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{PremiumGate, SubscriptionStore};

/// `PremiumGate` that reads the reconciled subscription record.
pub struct SubscriptionPremiumGate {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionPremiumGate {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PremiumGate for SubscriptionPremiumGate {
    async fn has_premium_access(&self, customer_id: &str) -> Result<bool, DomainError> {
        let record = self.store.find_by_customer_id(customer_id).await?;
        Ok(record.map(|r| r.is_premium()).unwrap_or(false))
    }
}
