//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum routes for the webhook receiver and premium status
//! - `postgres` - PostgreSQL subscription store
//! - `memory` - In-memory subscription store for tests and local runs
//! - `stripe` - Stripe REST client

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use memory::InMemorySubscriptionStore;
pub use postgres::PostgresSubscriptionStore;
pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
