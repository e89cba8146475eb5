//! Typed billing events.
//!
//! A verified [`StripeEvent`] is decoded once into a [`BillingEvent`]; the
//! reconciler matches on the variant and never touches raw JSON.

use serde::{Deserialize, Serialize};

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";
pub const SUBSCRIPTION_CREATED: &str = "customer.subscription.created";
pub const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
pub const INVOICE_PAYMENT_SUCCEEDED: &str = "invoice.payment_succeeded";

// ════════════════════════════════════════════════════════════════════════════════
// Object shapes
// ════════════════════════════════════════════════════════════════════════════════

/// Reference that Stripe renders either as a bare ID or as an expanded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable {
    Id(String),
    Object { id: String },
}

impl Expandable {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object { id } => id,
        }
    }
}

/// Checkout session as delivered with `checkout.session.completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<Expandable>,
    #[serde(default)]
    pub subscription: Option<Expandable>,
    #[serde(default)]
    pub payment_intent: Option<Expandable>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

impl CheckoutSessionObject {
    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|details| details.email.as_deref())
            .filter(|email| !email.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// Payment intent as delivered with `payment_intent.*` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub customer: Option<Expandable>,
}

/// Subscription as delivered with `customer.subscription.*` events and as
/// returned by the subscriptions API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: Expandable,
    pub status: String,
    #[serde(default)]
    pub items: SubscriptionItems,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionItem {
    #[serde(default)]
    pub price: Option<PriceRef>,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRef {
    pub id: String,
}

impl SubscriptionObject {
    /// Price of the first subscription item.
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }

    /// Period start, falling back to the first item on newer API versions
    /// where the top-level field is gone.
    pub fn period_start(&self) -> Option<i64> {
        self.current_period_start.or_else(|| {
            self.items
                .data
                .first()
                .and_then(|item| item.current_period_start)
        })
    }

    /// Period end, with the same item fallback as [`Self::period_start`].
    pub fn period_end(&self) -> Option<i64> {
        self.current_period_end.or_else(|| {
            self.items
                .data
                .first()
                .and_then(|item| item.current_period_end)
        })
    }
}

/// Invoice as delivered with `invoice.payment_succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer: Option<Expandable>,
    #[serde(default)]
    pub subscription: Option<Expandable>,
    #[serde(default)]
    pub parent: Option<InvoiceParent>,
}

/// Newer API versions move the subscription reference under `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceParent {
    #[serde(default)]
    pub subscription_details: Option<InvoiceSubscriptionDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSubscriptionDetails {
    #[serde(default)]
    pub subscription: Option<Expandable>,
}

impl InvoiceObject {
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription
            .as_ref()
            .or_else(|| {
                self.parent
                    .as_ref()
                    .and_then(|parent| parent.subscription_details.as_ref())
                    .and_then(|details| details.subscription.as_ref())
            })
            .map(Expandable::id)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Event union
// ════════════════════════════════════════════════════════════════════════════════

/// Billing events this service understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    CheckoutSessionCompleted(CheckoutSessionObject),
    PaymentIntentSucceeded(PaymentIntentObject),
    PaymentIntentFailed(PaymentIntentObject),
    SubscriptionCreated(SubscriptionObject),
    SubscriptionUpdated(SubscriptionObject),
    SubscriptionDeleted(SubscriptionObject),
    InvoicePaymentSucceeded(InvoiceObject),
    /// Any other event type. Acknowledged without side effects.
    Unhandled(String),
}

impl BillingEvent {
    /// Decodes the event's embedded object according to its type.
    ///
    /// # Errors
    ///
    /// `ParseError` if a known event type carries an object of the wrong shape.
    pub fn from_event(event: &StripeEvent) -> Result<Self, WebhookError> {
        let decoded = match event.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => {
                Self::CheckoutSessionCompleted(decode_object(event)?)
            }
            PAYMENT_INTENT_SUCCEEDED => Self::PaymentIntentSucceeded(decode_object(event)?),
            PAYMENT_INTENT_FAILED => Self::PaymentIntentFailed(decode_object(event)?),
            SUBSCRIPTION_CREATED => Self::SubscriptionCreated(decode_object(event)?),
            SUBSCRIPTION_UPDATED => Self::SubscriptionUpdated(decode_object(event)?),
            SUBSCRIPTION_DELETED => Self::SubscriptionDeleted(decode_object(event)?),
            INVOICE_PAYMENT_SUCCEEDED => Self::InvoicePaymentSucceeded(decode_object(event)?),
            other => Self::Unhandled(other.to_string()),
        };
        Ok(decoded)
    }

    /// The Stripe event type string for this variant.
    pub fn kind(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted(_) => CHECKOUT_SESSION_COMPLETED,
            Self::PaymentIntentSucceeded(_) => PAYMENT_INTENT_SUCCEEDED,
            Self::PaymentIntentFailed(_) => PAYMENT_INTENT_FAILED,
            Self::SubscriptionCreated(_) => SUBSCRIPTION_CREATED,
            Self::SubscriptionUpdated(_) => SUBSCRIPTION_UPDATED,
            Self::SubscriptionDeleted(_) => SUBSCRIPTION_DELETED,
            Self::InvoicePaymentSucceeded(_) => INVOICE_PAYMENT_SUCCEEDED,
            Self::Unhandled(event_type) => event_type,
        }
    }
}

fn decode_object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, WebhookError> {
    event.deserialize_object().map_err(|e| {
        WebhookError::ParseError(format!("invalid {} object: {}", event.event_type, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::stripe_event::StripeEventBuilder;
    use serde_json::json;

    fn decode(event_type: &str, object: serde_json::Value) -> Result<BillingEvent, WebhookError> {
        let event = StripeEventBuilder::new()
            .event_type(event_type)
            .object(object)
            .build();
        BillingEvent::from_event(&event)
    }

    // ══════════════════════════════════════════════════════════════
    // Dispatch by type
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn checkout_completed_decodes_session() {
        let event = decode(
            CHECKOUT_SESSION_COMPLETED,
            json!({
                "id": "cs_1",
                "customer": "cus_1",
                "subscription": "sub_1",
                "payment_intent": null,
                "customer_details": {"email": "a@b.com"}
            }),
        )
        .unwrap();

        match event {
            BillingEvent::CheckoutSessionCompleted(session) => {
                assert_eq!(session.customer.as_ref().map(Expandable::id), Some("cus_1"));
                assert_eq!(session.subscription.as_ref().map(Expandable::id), Some("sub_1"));
                assert!(session.payment_intent.is_none());
                assert_eq!(session.customer_email(), Some("a@b.com"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn payment_intent_events_decode_by_outcome() {
        let object = json!({"id": "pi_1", "customer": "cus_1"});

        assert!(matches!(
            decode(PAYMENT_INTENT_SUCCEEDED, object.clone()).unwrap(),
            BillingEvent::PaymentIntentSucceeded(_)
        ));
        assert!(matches!(
            decode(PAYMENT_INTENT_FAILED, object).unwrap(),
            BillingEvent::PaymentIntentFailed(_)
        ));
    }

    #[test]
    fn subscription_events_decode_subscription() {
        let object = json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "items": {"data": [{"price": {"id": "price_x"}}]},
            "current_period_start": 1700000000,
            "current_period_end": 1702592000
        });

        for (event_type, expected) in [
            (SUBSCRIPTION_CREATED, "created"),
            (SUBSCRIPTION_UPDATED, "updated"),
            (SUBSCRIPTION_DELETED, "deleted"),
        ] {
            let event = decode(event_type, object.clone()).unwrap();
            let actual = match &event {
                BillingEvent::SubscriptionCreated(_) => "created",
                BillingEvent::SubscriptionUpdated(_) => "updated",
                BillingEvent::SubscriptionDeleted(_) => "deleted",
                _ => "other",
            };
            assert_eq!(actual, expected);
            assert_eq!(event.kind(), event_type);
        }
    }

    #[test]
    fn unknown_type_is_unhandled_without_touching_object() {
        let event = decode("some.future.event", json!("not even an object")).unwrap();

        assert_eq!(event, BillingEvent::Unhandled("some.future.event".to_string()));
        assert_eq!(event.kind(), "some.future.event");
    }

    #[test]
    fn known_type_with_wrong_shape_is_parse_error() {
        let result = decode(SUBSCRIPTION_UPDATED, json!({"id": "sub_1"}));

        match result {
            Err(WebhookError::ParseError(message)) => {
                assert!(message.contains(SUBSCRIPTION_UPDATED));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Object helpers
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn expandable_accepts_id_or_expanded_object() {
        let id: Expandable = serde_json::from_value(json!("cus_1")).unwrap();
        let object: Expandable =
            serde_json::from_value(json!({"id": "cus_2", "email": "x@y.z", "object": "customer"}))
                .unwrap();

        assert_eq!(id.id(), "cus_1");
        assert_eq!(object.id(), "cus_2");
    }

    #[test]
    fn empty_email_counts_as_missing() {
        let session: CheckoutSessionObject = serde_json::from_value(json!({
            "id": "cs_1",
            "customer_details": {"email": ""}
        }))
        .unwrap();

        assert_eq!(session.customer_email(), None);
    }

    #[test]
    fn subscription_period_prefers_top_level_fields() {
        let sub: SubscriptionObject = serde_json::from_value(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "items": {"data": [{"price": {"id": "price_x"}, "current_period_start": 1, "current_period_end": 2}]},
            "current_period_start": 1700000000,
            "current_period_end": 1702592000
        }))
        .unwrap();

        assert_eq!(sub.price_id(), Some("price_x"));
        assert_eq!(sub.period_start(), Some(1_700_000_000));
        assert_eq!(sub.period_end(), Some(1_702_592_000));
    }

    #[test]
    fn subscription_period_falls_back_to_first_item() {
        let sub: SubscriptionObject = serde_json::from_value(json!({
            "id": "sub_1",
            "customer": {"id": "cus_1"},
            "status": "active",
            "items": {"data": [{"price": {"id": "price_x"}, "current_period_start": 1700000000, "current_period_end": 1702592000}]}
        }))
        .unwrap();

        assert_eq!(sub.customer.id(), "cus_1");
        assert_eq!(sub.period_start(), Some(1_700_000_000));
        assert_eq!(sub.period_end(), Some(1_702_592_000));
    }

    #[test]
    fn subscription_without_items_has_no_price() {
        let sub: SubscriptionObject = serde_json::from_value(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "incomplete"
        }))
        .unwrap();

        assert_eq!(sub.price_id(), None);
        assert_eq!(sub.period_start(), None);
    }

    #[test]
    fn invoice_subscription_reads_legacy_and_parent_fields() {
        let legacy: InvoiceObject =
            serde_json::from_value(json!({"id": "in_1", "subscription": "sub_1"})).unwrap();
        let nested: InvoiceObject = serde_json::from_value(json!({
            "id": "in_2",
            "subscription": null,
            "parent": {"subscription_details": {"subscription": "sub_2"}}
        }))
        .unwrap();
        let none: InvoiceObject = serde_json::from_value(json!({"id": "in_3"})).unwrap();

        assert_eq!(legacy.subscription_id(), Some("sub_1"));
        assert_eq!(nested.subscription_id(), Some("sub_2"));
        assert_eq!(none.subscription_id(), None);
    }
}
