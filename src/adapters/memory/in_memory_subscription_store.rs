//! In-memory subscription store.
//!
//! Used by tests and by store-less development runs. Mirrors the PostgreSQL
//! adapter's semantics: unique customer, upsert overwrites, zero-row updates
//! are reported rather than raised.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(InMemorySubscriptionStore::new());
//! reconciler.apply(&event).await?;
//! assert_eq!(store.write_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::subscription::{SubscriptionPatch, SubscriptionRecord, SubscriptionSnapshot};
use crate::ports::{SubscriptionStore, WriteOutcome};

/// In-memory store keyed by `stripe_customer_id`.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    records: RwLock<HashMap<String, SubscriptionRecord>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Number of write calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing write counting.
    pub async fn seed(&self, record: SubscriptionRecord) {
        self.records
            .write()
            .await
            .insert(record.stripe_customer_id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn begin_write(&self) -> Result<(), DomainError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated store outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn upsert_by_customer_id(
        &self,
        snapshot: &SubscriptionSnapshot,
    ) -> Result<WriteOutcome, DomainError> {
        self.begin_write()?;
        let now = Timestamp::now();
        let mut records = self.records.write().await;

        match records.get_mut(&snapshot.stripe_customer_id) {
            Some(existing) => {
                snapshot.overwrite(existing, now);
                Ok(WriteOutcome::Updated { rows: 1 })
            }
            None => {
                records.insert(
                    snapshot.stripe_customer_id.clone(),
                    snapshot.clone().into_record(now),
                );
                Ok(WriteOutcome::Inserted)
            }
        }
    }

    async fn update_by_customer_id(
        &self,
        customer_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<WriteOutcome, DomainError> {
        self.begin_write()?;
        let mut records = self.records.write().await;

        let rows = match records.get_mut(customer_id) {
            Some(record) => {
                patch.apply_to(record, Timestamp::now());
                1
            }
            None => 0,
        };
        Ok(WriteOutcome::Updated { rows })
    }

    async fn insert(&self, snapshot: &SubscriptionSnapshot) -> Result<WriteOutcome, DomainError> {
        self.begin_write()?;
        let mut records = self.records.write().await;

        if records.contains_key(&snapshot.stripe_customer_id) {
            return Ok(WriteOutcome::AlreadyPresent);
        }
        records.insert(
            snapshot.stripe_customer_id.clone(),
            snapshot.clone().into_record(Timestamp::now()),
        );
        Ok(WriteOutcome::Inserted)
    }

    async fn update_by_subscription_id(
        &self,
        subscription_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<WriteOutcome, DomainError> {
        self.begin_write()?;
        let now = Timestamp::now();
        let mut records = self.records.write().await;

        let mut rows = 0;
        for record in records
            .values_mut()
            .filter(|r| r.stripe_subscription_id.as_deref() == Some(subscription_id))
        {
            patch.apply_to(record, now);
            rows += 1;
        }
        Ok(WriteOutcome::Updated { rows })
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self.records.read().await.get(customer_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::subscription::SubscriptionStatus;

    fn snapshot(customer: &str, subscription: Option<&str>) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            stripe_customer_id: customer.to_string(),
            stripe_subscription_id: subscription.map(str::to_string),
            stripe_payment_intent_id: None,
            status: SubscriptionStatus::Active,
            price_id: Some("price_x".to_string()),
            current_period_start: None,
            current_period_end: None,
        }
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates_same_row() {
        let store = InMemorySubscriptionStore::new();

        let first = store.upsert_by_customer_id(&snapshot("cus_1", Some("sub_1"))).await.unwrap();
        let id = store.find_by_customer_id("cus_1").await.unwrap().unwrap().id;

        let mut next = snapshot("cus_1", Some("sub_1"));
        next.status = SubscriptionStatus::PastDue;
        let second = store.upsert_by_customer_id(&next).await.unwrap();

        assert_eq!(first, WriteOutcome::Inserted);
        assert_eq!(second, WriteOutcome::Updated { rows: 1 });
        assert_eq!(store.len().await, 1);
        let record = store.find_by_customer_id("cus_1").await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.status, SubscriptionStatus::PastDue);
    }

    #[tokio::test]
    async fn insert_leaves_existing_record_untouched() {
        let store = InMemorySubscriptionStore::new();
        store.insert(&snapshot("cus_1", Some("sub_1"))).await.unwrap();

        let mut other = snapshot("cus_1", Some("sub_2"));
        other.status = SubscriptionStatus::Incomplete;
        let outcome = store.insert(&other).await.unwrap();

        assert_eq!(outcome, WriteOutcome::AlreadyPresent);
        let record = store.find_by_customer_id("cus_1").await.unwrap().unwrap();
        assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(record.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn update_without_match_reports_zero_rows() {
        let store = InMemorySubscriptionStore::new();
        let patch = SubscriptionPatch::status(SubscriptionStatus::Canceled);

        assert_eq!(
            store.update_by_customer_id("cus_x", &patch).await.unwrap(),
            WriteOutcome::Updated { rows: 0 }
        );
        assert_eq!(
            store.update_by_subscription_id("sub_x", &patch).await.unwrap(),
            WriteOutcome::Updated { rows: 0 }
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_by_subscription_id_matches_subscription_column() {
        let store = InMemorySubscriptionStore::new();
        store.insert(&snapshot("cus_1", Some("sub_1"))).await.unwrap();
        store.insert(&snapshot("cus_2", Some("sub_2"))).await.unwrap();

        let outcome = store
            .update_by_subscription_id("sub_2", &SubscriptionPatch::status(SubscriptionStatus::Canceled))
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Updated { rows: 1 });
        let one = store.find_by_customer_id("cus_1").await.unwrap().unwrap();
        let two = store.find_by_customer_id("cus_2").await.unwrap().unwrap();
        assert_eq!(one.status, SubscriptionStatus::Active);
        assert_eq!(two.status, SubscriptionStatus::Canceled);
    }

    #[tokio::test]
    async fn failing_store_counts_attempt_and_errors() {
        let store = InMemorySubscriptionStore::new();
        store.fail_writes(true);

        let err = store.insert(&snapshot("cus_1", None)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(store.write_count(), 1);
        assert!(store.is_empty().await);
    }
}
