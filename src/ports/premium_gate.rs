//! Premium access port.
//!
//! Diary mutations are allowed only for customers whose subscription is
//! currently active. The gate only reads; writes happen through webhooks.

use crate::domain::foundation::DomainError;
use async_trait::async_trait;

/// Port for checking whether a customer may use premium features.
#[async_trait]
pub trait PremiumGate: Send + Sync {
    /// True exactly when a record exists for the customer with status `active`.
    async fn has_premium_access(&self, customer_id: &str) -> Result<bool, DomainError>;
}
