//! PostgreSQL implementation of SubscriptionStore.
//!
//! Each operation is one statement. Uniqueness on `stripe_customer_id` is
//! enforced by the `subscriptions_stripe_customer_id_key` constraint, so
//! concurrent deliveries for the same customer cannot create duplicates.

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::subscription::{
    SubscriptionPatch, SubscriptionRecord, SubscriptionSnapshot, SubscriptionStatus,
};
use crate::ports::{SubscriptionStore, WriteOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the SubscriptionStore port.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    stripe_customer_id: String,
    stripe_subscription_id: Option<String>,
    stripe_payment_intent_id: Option<String>,
    status: String,
    price_id: Option<String>,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;

        Ok(SubscriptionRecord {
            id: row.id,
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            stripe_payment_intent_id: row.stripe_payment_intent_id,
            status,
            price_id: row.price_id,
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    SubscriptionStatus::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid status value: {}", s),
        )
    })
}

fn to_datetime(ts: Option<Timestamp>) -> Option<DateTime<Utc>> {
    ts.map(|t| *t.as_datetime())
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", action, e),
    )
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn upsert_by_customer_id(
        &self,
        snapshot: &SubscriptionSnapshot,
    ) -> Result<WriteOutcome, DomainError> {
        // xmax is 0 only for rows created by this statement.
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (
                id, stripe_customer_id, stripe_subscription_id, stripe_payment_intent_id,
                status, price_id, current_period_start, current_period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            ON CONFLICT (stripe_customer_id) DO UPDATE SET
                stripe_subscription_id = EXCLUDED.stripe_subscription_id,
                stripe_payment_intent_id = EXCLUDED.stripe_payment_intent_id,
                status = EXCLUDED.status,
                price_id = EXCLUDED.price_id,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&snapshot.stripe_customer_id)
        .bind(&snapshot.stripe_subscription_id)
        .bind(&snapshot.stripe_payment_intent_id)
        .bind(snapshot.status.as_str())
        .bind(&snapshot.price_id)
        .bind(to_datetime(snapshot.current_period_start))
        .bind(to_datetime(snapshot.current_period_end))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("upsert subscription", e))?;

        Ok(if inserted {
            WriteOutcome::Inserted
        } else {
            WriteOutcome::Updated { rows: 1 }
        })
    }

    async fn update_by_customer_id(
        &self,
        customer_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<WriteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = COALESCE($2, status),
                stripe_payment_intent_id = COALESCE($3, stripe_payment_intent_id),
                price_id = COALESCE($4, price_id),
                current_period_start = COALESCE($5, current_period_start),
                current_period_end = COALESCE($6, current_period_end),
                updated_at = NOW()
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(customer_id)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(&patch.stripe_payment_intent_id)
        .bind(&patch.price_id)
        .bind(to_datetime(patch.current_period_start))
        .bind(to_datetime(patch.current_period_end))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update subscription by customer", e))?;

        Ok(WriteOutcome::Updated {
            rows: result.rows_affected(),
        })
    }

    async fn insert(&self, snapshot: &SubscriptionSnapshot) -> Result<WriteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, stripe_customer_id, stripe_subscription_id, stripe_payment_intent_id,
                status, price_id, current_period_start, current_period_end, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            ON CONFLICT (stripe_customer_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&snapshot.stripe_customer_id)
        .bind(&snapshot.stripe_subscription_id)
        .bind(&snapshot.stripe_payment_intent_id)
        .bind(snapshot.status.as_str())
        .bind(&snapshot.price_id)
        .bind(to_datetime(snapshot.current_period_start))
        .bind(to_datetime(snapshot.current_period_end))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert subscription", e))?;

        Ok(if result.rows_affected() == 0 {
            WriteOutcome::AlreadyPresent
        } else {
            WriteOutcome::Inserted
        })
    }

    async fn update_by_subscription_id(
        &self,
        subscription_id: &str,
        patch: &SubscriptionPatch,
    ) -> Result<WriteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = COALESCE($2, status),
                stripe_payment_intent_id = COALESCE($3, stripe_payment_intent_id),
                price_id = COALESCE($4, price_id),
                current_period_start = COALESCE($5, current_period_start),
                current_period_end = COALESCE($6, current_period_end),
                updated_at = NOW()
            WHERE stripe_subscription_id = $1
            "#,
        )
        .bind(subscription_id)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(&patch.stripe_payment_intent_id)
        .bind(&patch.price_id)
        .bind(to_datetime(patch.current_period_start))
        .bind(to_datetime(patch.current_period_end))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update subscription by id", e))?;

        Ok(WriteOutcome::Updated {
            rows: result.rows_affected(),
        })
    }

    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, stripe_customer_id, stripe_subscription_id, stripe_payment_intent_id,
                   status, price_id, current_period_start, current_period_end,
                   created_at, updated_at
            FROM subscriptions
            WHERE stripe_customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find subscription", e))?;

        row.map(SubscriptionRecord::try_from).transpose()
    }
}
