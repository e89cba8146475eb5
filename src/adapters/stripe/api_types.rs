//! Stripe REST API wire types.
//!
//! Subscription bodies reuse the domain's [`SubscriptionObject`], which already
//! mirrors the Stripe shape; this module adds the error envelope and the
//! conversion into the provider-neutral port type.

use serde::{Deserialize, Serialize};

use crate::domain::subscription::SubscriptionObject;
use crate::ports::ProviderSubscription;

/// Error body returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeApiError {
    /// Error category (e.g. "invalid_request_error").
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    /// Machine-readable code (e.g. "resource_missing").
    #[serde(default)]
    pub code: Option<String>,

    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

impl From<SubscriptionObject> for ProviderSubscription {
    fn from(sub: SubscriptionObject) -> Self {
        let price_id = sub.price_id().map(str::to_string);
        let current_period_start = sub.period_start();
        let current_period_end = sub.period_end();

        ProviderSubscription {
            customer_id: sub.customer.id().to_string(),
            id: sub.id,
            status: sub.status,
            price_id,
            current_period_start,
            current_period_end,
        }
    }
}
