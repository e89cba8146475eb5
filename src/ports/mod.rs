//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionStore` - Subscription record persistence
//! - `PaymentProvider` - Stripe subscription lookups
//! - `PremiumGate` - Read-side premium access check

mod payment_provider;
mod premium_gate;
mod subscription_store;

pub use payment_provider::{PaymentError, PaymentErrorCode, ProviderSubscription, PaymentProvider};
pub use premium_gate::PremiumGate;
pub use subscription_store::{SubscriptionStore, WriteOutcome};
