//! Subscription store port.
//!
//! Persistence contract for subscription records. Every operation is a single
//! idempotent statement, so re-delivered webhooks converge on the same row.
//!
//! # Design
//!
//! - **Unique customer**: at most one record per `stripe_customer_id`
//! - **No deletes**: cancellation is a status update
//! - **Zero-row updates are not errors**: reported through [`WriteOutcome`]

use crate::domain::foundation::DomainError;
use crate::domain::subscription::{SubscriptionPatch, SubscriptionRecord, SubscriptionSnapshot};
use async_trait::async_trait;

/// What a single store write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new record was created.
    Inserted,
    /// `rows` existing records were changed. Zero means nothing matched.
    Updated { rows: u64 },
    /// Insert skipped because a record for the customer already exists.
    AlreadyPresent,
}

impl WriteOutcome {
    /// Returns true if the write touched a row.
    pub fn wrote(&self) -> bool {
        match self {
            WriteOutcome::Inserted => true,
            WriteOutcome::Updated { rows } => *rows > 0,
            WriteOutcome::AlreadyPresent => false,
        }
    }
}

/// Repository port for subscription records.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a record, or overwrite every reconciled field of the record with
    /// the same `stripe_customer_id`.
    ///
    /// Returns `Inserted` or `Updated { rows: 1 }`.
    async fn upsert_by_customer_id(
        &self,
        snapshot: &SubscriptionSnapshot,
    ) -> Result<WriteOutcome, DomainError>;

    /// Apply a patch to the record for a customer.
    async fn update_by_customer_id(
        &self,
        customer_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<WriteOutcome, DomainError>;

    /// Insert a record unless one already exists for the customer.
    ///
    /// Returns `Inserted` or `AlreadyPresent`; never creates a duplicate.
    async fn insert(&self, snapshot: &SubscriptionSnapshot) -> Result<WriteOutcome, DomainError>;

    /// Apply a patch to the record holding a subscription ID.
    async fn update_by_subscription_id(
        &self,
        subscription_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<WriteOutcome, DomainError>;

    /// Find the record for a customer.
    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;
}
