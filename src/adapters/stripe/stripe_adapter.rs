//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port over the Stripe REST API.
//!
//! # Security
//!
//! - The secret API key is held as `secrecy::SecretString` and only exposed
//!   when building the basic-auth header
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_api_version("2024-12-18.acacia");
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::subscription::SubscriptionObject;
use crate::ports::{PaymentError, PaymentProvider, ProviderSubscription};

use super::api_types::StripeErrorResponse;

/// Default Stripe API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// API version requests are pinned to.
pub const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Value of the `Stripe-Version` header.
    api_version: String,
}

impl StripeConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// `{base}/v1/subscriptions/{id}`, with the id encoded as a single path segment.
    fn subscription_url(&self, subscription_id: &str) -> Result<reqwest::Url, PaymentError> {
        let mut url = reqwest::Url::parse(&self.config.api_base_url)
            .map_err(|e| PaymentError::provider(format!("Invalid Stripe API base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| PaymentError::provider("Stripe API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v1", "subscriptions", subscription_id]);

        Ok(url)
    }

    /// Builds a `PaymentError` from a non-2xx Stripe response.
    async fn error_from_response(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let parsed = serde_json::from_str::<StripeErrorResponse>(&body).ok();
        let message = parsed
            .as_ref()
            .and_then(|r| r.error.message.clone())
            .unwrap_or_else(|| format!("Stripe API error ({})", status));

        let error = if status == reqwest::StatusCode::NOT_FOUND {
            PaymentError::not_found("Subscription")
        } else {
            PaymentError::provider(message)
        };

        match parsed.and_then(|r| r.error.code) {
            Some(code) => error.with_provider_code(code),
            None => error,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, PaymentError> {
        let url = self.subscription_url(subscription_id)?;

        let response = self
            .http_client
            .get(url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let error = Self::error_from_response(response).await;
            tracing::warn!(
                subscription_id = %subscription_id,
                code = %error.code,
                "Stripe subscription lookup failed"
            );
            return Err(error);
        }

        let subscription: SubscriptionObject = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(subscription.into())
    }
}
