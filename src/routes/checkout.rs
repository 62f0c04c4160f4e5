use anyhow::Context;
use axum::{Json, extract::State, response::IntoResponse};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::{
    app_error::AppError,
    app_state::AppState,
    config::Config,
    models::CreateOrderEntity,
    schema::orders,
    square::types::{
        CheckoutOptions, CreatePaymentLinkRequest, LineItemRequest, Money, OrderRequest,
        PrePopulatedData,
    },
};

const CURRENCY: &str = "CAD";

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/api",
        OpenApiRouter::new().routes(utoipa_axum::routes!(create_checkout)),
    )
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutReq {
    pub items: Vec<CheckoutItem>,
    pub customer_email: String,
    /// Internal order ID; generated when absent.
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct CheckoutItem {
    pub name: String,
    pub quantity: u32,
    /// Decimal major units (dollars).
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRes {
    pub checkout_url: String,
    /// The merchant order_uid; pass it back to `/api/verify-payment`.
    pub order_id: String,
}

/// Create a hosted Square checkout session for a cart and record the order.
#[utoipa::path(
    post,
    path = "/create-checkout",
    tags = ["Checkout"],
    request_body = CreateCheckoutReq,
    responses(
        (status = 200, description = "Checkout session created", body = CreateCheckoutRes),
        (status = 400, description = "Invalid items or missing email"),
        (status = 500, description = "Missing Square credentials or provider failure")
    )
)]
async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<CreateCheckoutReq>,
) -> Result<impl IntoResponse, AppError> {
    let order_uid = body
        .order_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let request = build_payment_link_request(&body, &order_uid, &state.config)?;
    let payment_link = state.square.create_payment_link(&request).await?;

    let order_cost = body
        .items
        .iter()
        .map(|item| item.price * item.quantity as f64)
        .sum();

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    diesel::insert_into(orders::table)
        .values(CreateOrderEntity {
            order_uid: order_uid.clone(),
            provider_order_id: payment_link.order_id.clone(),
            customer_name: String::new(),
            email: body.customer_email.clone(),
            order_cost,
            misc_fees: 0.0,
        })
        .execute(conn)
        .await
        .context("Failed to create order")?;

    tracing::info!(%order_uid, "Checkout session created");

    Ok(Json(CreateCheckoutRes {
        checkout_url: payment_link.url,
        order_id: order_uid,
    }))
}

/// Validates the cart and assembles the Square payment-link request. The
/// idempotency key is derived from the order_uid so a retried call maps to
/// the same provider-side session instead of minting a duplicate.
fn build_payment_link_request(
    body: &CreateCheckoutReq,
    order_uid: &str,
    config: &Config,
) -> Result<CreatePaymentLinkRequest, AppError> {
    if body.items.is_empty() {
        return Err(AppError::BadRequest("Invalid items".into()));
    }
    for item in &body.items {
        if item.name.is_empty() || item.quantity < 1 || item.price <= 0.0 {
            return Err(AppError::BadRequest("Invalid items".into()));
        }
    }
    if body.customer_email.is_empty() {
        return Err(AppError::BadRequest("Customer email is required".into()));
    }

    let location_id = config
        .square
        .location_id
        .as_deref()
        .ok_or_else(|| AppError::Config("SQUARE_LOCATION_ID is not set".into()))?;

    let line_items = body
        .items
        .iter()
        .map(|item| LineItemRequest {
            name: item.name.clone(),
            quantity: item.quantity.to_string(),
            base_price_money: Money::from_major(item.price, CURRENCY),
            note: item.description.clone(),
        })
        .collect();

    Ok(CreatePaymentLinkRequest {
        idempotency_key: Uuid::new_v5(&Uuid::NAMESPACE_URL, order_uid.as_bytes()).to_string(),
        order: OrderRequest {
            location_id: location_id.to_string(),
            reference_id: order_uid.to_string(),
            line_items,
        },
        checkout_options: Some(CheckoutOptions {
            redirect_url: format!("{}/thank-you", config.http.base_url),
            ask_for_shipping_address: false,
            merchant_support_email: config
                .email
                .support_email
                .clone()
                .or_else(|| Some(body.customer_email.clone())),
        }),
        pre_populated_data: Some(PrePopulatedData {
            buyer_email: body.customer_email.clone(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, EmailConfig, HttpConfig, SquareConfig};

    fn test_config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgres://unused".into(),
            },
            http: HttpConfig {
                listen_addr: "127.0.0.1:0".into(),
                base_url: "https://bakery.example.com".into(),
            },
            square: SquareConfig {
                api_base_url: "https://connect.squareupsandbox.com".into(),
                access_token: Some("token".into()),
                location_id: Some("LOC1".into()),
                webhook_signature_key: None,
                webhook_notification_url: None,
            },
            email: EmailConfig {
                brevo_api_key: None,
                sender_email: "orders@bakery.example.com".into(),
                sender_name: "Bakery".into(),
                support_email: None,
            },
        }
    }

    fn cookie_box_request() -> CreateCheckoutReq {
        CreateCheckoutReq {
            items: vec![CheckoutItem {
                name: "Cookie Box".into(),
                quantity: 2,
                price: 12.50,
                description: None,
            }],
            customer_email: "a@b.com".into(),
            order_id: None,
        }
    }

    #[test]
    fn builds_minor_unit_line_items() {
        let request =
            build_payment_link_request(&cookie_box_request(), "uid-1", &test_config()).unwrap();

        assert_eq!(request.order.reference_id, "uid-1");
        assert_eq!(request.order.line_items.len(), 1);
        let line = &request.order.line_items[0];
        assert_eq!(line.quantity, "2");
        assert_eq!(line.base_price_money.amount, 1250);
        assert_eq!(line.base_price_money.currency, CURRENCY);
    }

    #[test]
    fn idempotency_key_is_stable_per_order() {
        let config = test_config();
        let first = build_payment_link_request(&cookie_box_request(), "uid-1", &config).unwrap();
        let second = build_payment_link_request(&cookie_box_request(), "uid-1", &config).unwrap();
        let other = build_payment_link_request(&cookie_box_request(), "uid-2", &config).unwrap();

        assert_eq!(first.idempotency_key, second.idempotency_key);
        assert_ne!(first.idempotency_key, other.idempotency_key);
    }

    #[test]
    fn empty_cart_is_rejected() {
        let mut request = cookie_box_request();
        request.items.clear();
        let err = build_payment_link_request(&request, "uid-1", &test_config()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut request = cookie_box_request();
        request.items[0].quantity = 0;
        let err = build_payment_link_request(&request, "uid-1", &test_config()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn missing_email_is_rejected() {
        let mut request = cookie_box_request();
        request.customer_email.clear();
        let err = build_payment_link_request(&request, "uid-1", &test_config()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn missing_location_id_is_a_config_error() {
        let mut config = test_config();
        config.square.location_id = None;
        let err = build_payment_link_request(&cookie_box_request(), "uid-1", &config).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
