//! Webhook error types for Stripe webhook handling.
//!
//! Covers every failure between receiving a delivery and writing the
//! subscription record, with HTTP status mapping.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::ports::PaymentError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A required secret is not configured for this deployment.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    /// Request carried no Stripe-Signature header.
    #[error("Missing signature header")]
    MissingSignature,

    /// Stripe-Signature header could not be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedSignature(String),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Test-mode event delivered to a deployment that only accepts live events.
    #[error("Test mode events are not accepted")]
    LivemodeRequired,

    /// Failed to parse the verified payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Payload parsed but carries values that cannot be stored.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Subscription store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Payment provider lookup failed.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl WebhookError {
    /// Returns true for rejections that indicate a forged, replayed or
    /// tampered delivery.
    pub fn is_security_rejection(&self) -> bool {
        matches!(
            self,
            WebhookError::MalformedSignature(_)
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// Returns true for errors raised while applying a verified event.
    ///
    /// These never change the acknowledgement sent to the provider.
    pub fn is_reconciliation_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::InvalidPayload(_) | WebhookError::Store(_) | WebhookError::Provider(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// - 4xx: bad delivery, the provider should not retry
    /// - 5xx: deployment or downstream problem
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,

            WebhookError::MissingSignature
            | WebhookError::MalformedSignature(_)
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::LivemodeRequired
            | WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            WebhookError::InvalidPayload(_)
            | WebhookError::Store(_)
            | WebhookError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Store(err.to_string())
    }
}

impl From<PaymentError> for WebhookError {
    fn from(err: PaymentError) -> Self {
        WebhookError::Provider(err.to_string())
    }
}
