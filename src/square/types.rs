//! Wire types for the subset of the Square REST API this service calls:
//! payment-link creation and order retrieval. Field names follow Square's
//! snake_case JSON.

use serde::{Deserialize, Serialize};

/// Terminal order/payment state on the Square side.
pub const COMPLETED: &str = "COMPLETED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    /// Minor currency units (cents).
    pub amount: i64,
    pub currency: String,
}

impl Money {
    /// Converts a decimal major-unit price (dollars) to minor units,
    /// rounding half up: 12.50 -> 1250.
    pub fn from_major(amount: f64, currency: &str) -> Self {
        Self {
            amount: (amount * 100.0).round() as i64,
            currency: currency.to_string(),
        }
    }

    pub fn to_major(&self) -> f64 {
        self.amount as f64 / 100.0
    }
}

// Payment-link creation

#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentLinkRequest {
    pub idempotency_key: String,
    pub order: OrderRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_options: Option<CheckoutOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_populated_data: Option<PrePopulatedData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub location_id: String,
    /// Carries the merchant's `order_uid`; the webhook path reads it back to
    /// correlate the Square order with the local record.
    pub reference_id: String,
    pub line_items: Vec<LineItemRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItemRequest {
    pub name: String,
    /// Square wants the quantity as a string.
    pub quantity: String,
    pub base_price_money: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOptions {
    pub redirect_url: String,
    pub ask_for_shipping_address: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_support_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrePopulatedData {
    pub buyer_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentLinkResponse {
    pub payment_link: PaymentLink,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentLink {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    /// The Square-side order ID backing this link.
    #[serde(default)]
    pub order_id: Option<String>,
}

// Order retrieval

#[derive(Debug, Clone, Deserialize)]
pub struct GetOrderResponse {
    pub order: SquareOrder,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SquareOrder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub total_money: Option<Money>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tenders: Option<Vec<Tender>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tender {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub amount_money: Option<Money>,
    #[serde(default)]
    pub card_details: Option<CardDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    #[serde(default)]
    pub card: Option<Card>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub card_brand: Option<String>,
    #[serde(default)]
    pub last_4: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_to_minor_rounds_half_up() {
        assert_eq!(Money::from_major(12.50, "CAD").amount, 1250);
        assert_eq!(Money::from_major(0.005, "CAD").amount, 1);
        assert_eq!(Money::from_major(19.999, "CAD").amount, 2000);
    }

    #[test]
    fn minor_to_major() {
        let money = Money {
            amount: 3050,
            currency: "CAD".into(),
        };
        assert_eq!(money.to_major(), 30.50);
    }

    #[test]
    fn order_deserializes_with_missing_optionals() {
        let order: SquareOrder = serde_json::from_str(r#"{"id": "sq-1"}"#).unwrap();
        assert_eq!(order.id, "sq-1");
        assert!(order.reference_id.is_none());
        assert!(order.tenders.is_none());
    }
}
