//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionStore` - Subscription records reconciled from webhooks

mod subscription_store;

pub use subscription_store::PostgresSubscriptionStore;
