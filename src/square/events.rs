//! Square webhook event envelope.

use serde::Deserialize;

/// Event types this service reacts to, with a catch-all for everything else.
/// Unknown types are logged and ignored; they never fail a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventType {
    PaymentCreated,
    PaymentUpdated,
    OrderCreated,
    OrderUpdated,
    Unknown,
}

impl From<&str> for WebhookEventType {
    fn from(value: &str) -> Self {
        match value {
            "payment.created" => Self::PaymentCreated,
            "payment.updated" => Self::PaymentUpdated,
            "order.created" => Self::OrderCreated,
            "order.updated" => Self::OrderUpdated,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub merchant_id: Option<String>,
    #[serde(default)]
    pub data: EventData,
}

impl WebhookEvent {
    pub fn typed(&self) -> WebhookEventType {
        WebhookEventType::from(self.event_type.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: EventObject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventObject {
    #[serde(default)]
    pub payment: Option<PaymentObject>,
    #[serde(default)]
    pub order: Option<OrderObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentObject {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Square's order ID, not the merchant's `order_uid`.
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderObject {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_payment_updated_event() {
        let raw = r#"{
            "merchant_id": "M1",
            "type": "payment.updated",
            "event_id": "evt-1",
            "data": {
                "type": "payment",
                "id": "pay-1",
                "object": {
                    "payment": {"id": "pay-1", "status": "COMPLETED", "order_id": "sq-order-1"}
                }
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.typed(), WebhookEventType::PaymentUpdated);
        let payment = event.data.object.payment.unwrap();
        assert_eq!(payment.status.as_deref(), Some("COMPLETED"));
        assert_eq!(payment.order_id.as_deref(), Some("sq-order-1"));
    }

    #[test]
    fn unknown_type_maps_to_unknown() {
        let event: WebhookEvent =
            serde_json::from_str(r#"{"type": "refund.created"}"#).unwrap();
        assert_eq!(event.typed(), WebhookEventType::Unknown);
        assert!(event.data.object.payment.is_none());
    }
}
