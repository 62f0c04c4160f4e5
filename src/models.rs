use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    /// Merchant-generated correlation key, embedded as the Square order's
    /// `reference_id`.
    pub order_uid: String,
    /// Square's own order ID, captured when the checkout session is created.
    pub provider_order_id: Option<String>,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub order_cost: f64,
    pub misc_fees: f64,
    pub is_paid: bool,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub order_uid: String,
    pub provider_order_id: Option<String>,
    pub customer_name: String,
    pub email: String,
    pub order_cost: f64,
    pub misc_fees: f64,
}
