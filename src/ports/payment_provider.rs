//! Payment provider port.
//!
//! The webhook flow only needs one read from the provider: the full
//! subscription behind a completed checkout session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment provider lookups.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Fetch a subscription by provider ID.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the provider has no such subscription
    /// - `NetworkError` on transport failure
    /// - `ProviderError` for any other provider rejection
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, PaymentError>;
}

/// Subscription as reported by the payment provider.
///
/// `status` is the provider's raw status string; it is folded into the local
/// status by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSubscription {
    /// Provider's subscription ID.
    pub id: String,

    /// Provider's customer ID.
    pub customer_id: String,

    /// Raw provider status (e.g. "trialing").
    pub status: String,

    /// Price of the first subscription item.
    pub price_id: Option<String>,

    /// Current billing period start (Unix timestamp).
    pub current_period_start: Option<i64>,

    /// Current billing period end (Unix timestamp).
    pub current_period_end: Option<i64>,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create a provider rejection.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Resource not found.
    NotFound,

    /// Provider API error, including authentication and rate limiting.
    ProviderError,
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn PaymentProvider) {}
    }

    #[test]
    fn constructors_set_codes() {
        assert_eq!(PaymentError::network("reset").code, PaymentErrorCode::NetworkError);
        assert_eq!(PaymentError::not_found("Subscription").code, PaymentErrorCode::NotFound);
        assert_eq!(PaymentError::provider("bad request").code, PaymentErrorCode::ProviderError);
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = PaymentError::not_found("Subscription");
        assert_eq!(err.to_string(), "not_found: Subscription not found");
    }

    #[test]
    fn provider_code_is_attached() {
        let err = PaymentError::provider("No such price").with_provider_code("resource_missing");
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
        assert_eq!(err.code, PaymentErrorCode::ProviderError);
    }
}
