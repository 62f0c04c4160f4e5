use anyhow::Context;
use axum::{Json, extract::Query, extract::State, response::IntoResponse};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::AppError,
    app_state::AppState,
    models::OrderEntity,
    schema::orders,
    square::types::{COMPLETED, SquareOrder},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/api",
        OpenApiRouter::new().routes(utoipa_axum::routes!(verify_payment)),
    )
}

#[derive(Deserialize, Debug)]
pub struct VerifyPaymentQuery {
    #[serde(rename = "orderId", default)]
    pub order_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRes {
    pub success: bool,
    pub order_id: String,
    pub is_paid: bool,
    pub total_amount: Option<f64>,
    pub currency: Option<String>,
    pub created_at: Option<String>,
    pub payment_details: Option<PaymentDetails>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub payment_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub card_brand: Option<String>,
    pub last_four_digits: Option<String>,
}

/// Synchronous payment check: reads current provider state for an order
/// without mutating anything locally, so it is safe to poll and safe to race
/// with the webhook path.
#[utoipa::path(
    get,
    path = "/verify-payment",
    tags = ["Payments"],
    params(
        ("orderId" = Option<String>, Query, description = "Merchant order_uid to check")
    ),
    responses(
        (status = 200, description = "Current payment state", body = VerifyPaymentRes),
        (status = 400, description = "Missing orderId"),
        (status = 404, description = "Unknown order"),
        (status = 500, description = "Provider failure")
    )
)]
async fn verify_payment(
    State(state): State<AppState>,
    Query(query): Query<VerifyPaymentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let order_uid = query
        .order_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Order ID required".into()))?;

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    // The merchant order_uid is the canonical identifier; translate to
    // Square's order ID before crossing the provider boundary.
    let order: Option<OrderEntity> = orders::table
        .filter(orders::order_uid.eq(&order_uid))
        .select(OrderEntity::as_select())
        .first(conn)
        .await
        .optional()
        .context("Failed to look up order")?;

    let order = order.ok_or(AppError::NotFound)?;
    let provider_order_id = order.provider_order_id.ok_or_else(|| {
        AppError::BadRequest("Order has no provider checkout session".into())
    })?;

    let square_order = state.square.get_order(&provider_order_id).await?;

    Ok(Json(summarize_order(&order_uid, square_order)))
}

fn summarize_order(order_uid: &str, order: SquareOrder) -> VerifyPaymentRes {
    let is_paid = order.state.as_deref() == Some(COMPLETED);

    let payment_details = order
        .tenders
        .as_ref()
        .and_then(|tenders| tenders.as_slice().first())
        .map(|tender| {
            let card = tender
                .card_details
                .as_ref()
                .and_then(|details| details.card.as_ref());
            PaymentDetails {
                payment_id: tender.id.clone(),
                amount: tender.amount_money.as_ref().map(|money| money.to_major()),
                currency: tender
                    .amount_money
                    .as_ref()
                    .map(|money| money.currency.clone()),
                card_brand: card.and_then(|card| card.card_brand.clone()),
                last_four_digits: card.and_then(|card| card.last_4.clone()),
            }
        });

    VerifyPaymentRes {
        success: true,
        order_id: order_uid.to_string(),
        is_paid,
        total_amount: order.total_money.as_ref().map(|money| money.to_major()),
        currency: order.total_money.as_ref().map(|money| money.currency.clone()),
        created_at: order.created_at,
        payment_details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::types::{Card, CardDetails, Money, Tender};

    #[test]
    fn completed_order_is_paid_with_major_units() {
        let order = SquareOrder {
            id: "sq-1".into(),
            reference_id: Some("uid-1".into()),
            state: Some(COMPLETED.into()),
            total_money: Some(Money {
                amount: 3050,
                currency: "CAD".into(),
            }),
            created_at: Some("2025-08-12T10:00:00Z".into()),
            tenders: None,
        };

        let res = summarize_order("uid-1", order);
        assert!(res.is_paid);
        assert_eq!(res.total_amount, Some(30.50));
        assert_eq!(res.currency.as_deref(), Some("CAD"));
        assert_eq!(res.order_id, "uid-1");
        assert!(res.payment_details.is_none());
    }

    #[test]
    fn open_order_is_not_paid() {
        let order = SquareOrder {
            id: "sq-1".into(),
            state: Some("OPEN".into()),
            ..SquareOrder::default()
        };
        assert!(!summarize_order("uid-1", order).is_paid);
    }

    #[test]
    fn first_tender_drives_payment_details() {
        let order = SquareOrder {
            id: "sq-1".into(),
            state: Some(COMPLETED.into()),
            tenders: Some(vec![Tender {
                id: Some("tender-1".into()),
                amount_money: Some(Money {
                    amount: 1250,
                    currency: "CAD".into(),
                }),
                card_details: Some(CardDetails {
                    card: Some(Card {
                        card_brand: Some("VISA".into()),
                        last_4: Some("4242".into()),
                    }),
                }),
            }]),
            ..SquareOrder::default()
        };

        let details = summarize_order("uid-1", order).payment_details.unwrap();
        assert_eq!(details.payment_id.as_deref(), Some("tender-1"));
        assert_eq!(details.amount, Some(12.50));
        assert_eq!(details.card_brand.as_deref(), Some("VISA"));
        assert_eq!(details.last_four_digits.as_deref(), Some("4242"));
    }
}
