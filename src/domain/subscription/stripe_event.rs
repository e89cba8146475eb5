//! Stripe webhook event envelope.
//!
//! Only fields relevant to our processing are captured. The embedded object is
//! kept as raw JSON here and decoded exactly once into a [`BillingEvent`].
//!
//! [`BillingEvent`]: super::BillingEvent

use serde::{Deserialize, Serialize};

/// Stripe webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: self.livemode,
            api_version: Some("2024-12-18.acacia".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {
                "object": {}
            },
            "livemode": false,
            "api_version": "2024-12-18.acacia"
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.created, 1704067200);
        assert!(!event.is_live());
        assert_eq!(event.api_version.as_deref(), Some("2024-12-18.acacia"));
    }

    #[test]
    fn deserialize_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": "evt_1",
            "type": "invoice.payment_succeeded",
            "created": 1704067200,
            "data": {"object": {"id": "in_1"}}
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert!(!event.livemode);
        assert!(event.api_version.is_none());
    }

    #[test]
    fn deserialize_ignores_previous_attributes() {
        let json = r#"{
            "id": "evt_update_123",
            "type": "customer.subscription.updated",
            "created": 1704067200,
            "data": {
                "object": {"status": "active"},
                "previous_attributes": {"status": "past_due"}
            },
            "livemode": true,
            "api_version": "2024-12-18.acacia"
        }"#;

        let event: StripeEvent = serde_json::from_str(json).unwrap();

        assert!(event.is_live());
        assert_eq!(event.data.object["status"], "active");
    }

    #[test]
    fn missing_type_fails_to_parse() {
        let json = r#"{"id": "evt_1", "created": 1, "data": {"object": {}}}"#;
        assert!(serde_json::from_str::<StripeEvent>(json).is_err());
    }

    #[test]
    fn deserialize_object_to_custom_type() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct PaymentIntent {
            id: String,
            customer: String,
        }

        let event = StripeEventBuilder::new()
            .object(json!({
                "id": "pi_abc123",
                "customer": "cus_xyz789"
            }))
            .build();

        let intent: PaymentIntent = event.deserialize_object().unwrap();
        assert_eq!(intent.id, "pi_abc123");
        assert_eq!(intent.customer, "cus_xyz789");
    }
}
