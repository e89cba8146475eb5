//! Subscription record and the write shapes the reconciler produces.
//!
//! # Invariants
//!
//! - At most one record per `stripe_customer_id`
//! - `stripe_subscription_id` becomes the reconciliation key once known
//! - Records are never deleted; cancellation is a status change

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::Timestamp;

use super::SubscriptionStatus;

/// One customer's billing relationship, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Surrogate key.
    pub id: Uuid,

    /// Provider customer ID (unique correlation key).
    pub stripe_customer_id: String,

    /// Provider subscription ID, once a subscription exists.
    pub stripe_subscription_id: Option<String>,

    /// Most recent payment attempt.
    pub stripe_payment_intent_id: Option<String>,

    pub status: SubscriptionStatus,

    /// Plan identifier.
    pub price_id: Option<String>,

    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,

    pub created_at: Timestamp,

    /// Set on every write.
    pub updated_at: Timestamp,
}

impl SubscriptionRecord {
    /// Returns true if this record unlocks premium features.
    pub fn is_premium(&self) -> bool {
        self.status.is_premium()
    }
}

/// Full set of reconciled fields for a customer.
///
/// Used both for upsert-by-customer (checkout completion) and for inserts
/// (subscription creation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub stripe_customer_id: String,
    pub stripe_subscription_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub status: SubscriptionStatus,
    pub price_id: Option<String>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
}

impl SubscriptionSnapshot {
    /// Builds a fresh record from this snapshot.
    pub fn into_record(self, now: Timestamp) -> SubscriptionRecord {
        SubscriptionRecord {
            id: Uuid::new_v4(),
            stripe_customer_id: self.stripe_customer_id,
            stripe_subscription_id: self.stripe_subscription_id,
            stripe_payment_intent_id: self.stripe_payment_intent_id,
            status: self.status,
            price_id: self.price_id,
            current_period_start: self.current_period_start,
            current_period_end: self.current_period_end,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every reconciled field of an existing record.
    ///
    /// `id` and `created_at` are preserved.
    pub fn overwrite(&self, record: &mut SubscriptionRecord, now: Timestamp) {
        record.stripe_subscription_id = self.stripe_subscription_id.clone();
        record.stripe_payment_intent_id = self.stripe_payment_intent_id.clone();
        record.status = self.status;
        record.price_id = self.price_id.clone();
        record.current_period_start = self.current_period_start;
        record.current_period_end = self.current_period_end;
        record.updated_at = now;
    }
}

/// Targeted update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub status: Option<SubscriptionStatus>,
    pub stripe_payment_intent_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
}

impl SubscriptionPatch {
    /// Patch that only moves the status.
    pub fn status(status: SubscriptionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_payment_intent(mut self, payment_intent_id: impl Into<String>) -> Self {
        self.stripe_payment_intent_id = Some(payment_intent_id.into());
        self
    }

    pub fn with_price(mut self, price_id: Option<String>) -> Self {
        self.price_id = price_id;
        self
    }

    pub fn with_period(mut self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        self.current_period_start = start;
        self.current_period_end = end;
        self
    }

    /// Applies the patch in place and bumps `updated_at`.
    pub fn apply_to(&self, record: &mut SubscriptionRecord, now: Timestamp) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(payment_intent_id) = &self.stripe_payment_intent_id {
            record.stripe_payment_intent_id = Some(payment_intent_id.clone());
        }
        if let Some(price_id) = &self.price_id {
            record.price_id = Some(price_id.clone());
        }
        if let Some(start) = self.current_period_start {
            record.current_period_start = Some(start);
        }
        if let Some(end) = self.current_period_end {
            record.current_period_end = Some(end);
        }
        record.updated_at = now;
    }
}
