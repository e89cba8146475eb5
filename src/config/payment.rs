//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
///
/// Both secrets are optional at startup. A deployment without them still
/// serves traffic; webhook deliveries fail with a configuration error.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    #[serde(default)]
    pub stripe_api_key: Option<SecretString>,

    /// Stripe webhook signing secret
    #[serde(default)]
    pub stripe_webhook_secret: Option<SecretString>,

    /// Stripe API endpoint
    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,

    /// Pinned `Stripe-Version` header value
    #[serde(default = "default_api_version")]
    pub stripe_api_version: String,

    /// Reject test-mode webhook events
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    /// API key, treating an empty value as absent
    pub fn api_key(&self) -> Option<&SecretString> {
        self.stripe_api_key
            .as_ref()
            .filter(|k| !k.expose_secret().is_empty())
    }

    /// Webhook secret, treating an empty value as absent
    pub fn webhook_secret(&self) -> Option<&SecretString> {
        self.stripe_webhook_secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())
    }

    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.api_key()
            .is_some_and(|k| k.expose_secret().starts_with("sk_test_"))
    }

    /// Validate payment configuration
    ///
    /// Absent secrets pass; present ones must carry the expected prefix.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = self.api_key() {
            if !key.expose_secret().starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }
        if let Some(secret) = self.webhook_secret() {
            if !secret.expose_secret().starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }
        if !self.stripe_api_base_url.starts_with("https://")
            && !self.stripe_api_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidStripeBaseUrl);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: None,
            stripe_webhook_secret: None,
            stripe_api_base_url: default_api_base_url(),
            stripe_api_version: default_api_version(),
            require_livemode: false,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_api_version() -> String {
    "2024-12-18.acacia".to_string()
}
