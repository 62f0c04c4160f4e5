use std::collections::HashMap;

use anyhow::Context;
use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    models::OrderEntity,
    schema::orders,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/api",
        OpenApiRouter::new().routes(utoipa_axum::routes!(get_customers)),
    )
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub total_spent: f64,
    pub total_orders: usize,
    pub latest_order_date: Option<DateTime<Utc>>,
    pub earliest_order_date: Option<DateTime<Utc>>,
    pub orders: Vec<OrderEntity>,
}

/// List customers grouped across their order history.
#[utoipa::path(
    get,
    path = "/customers",
    tags = ["Customers"],
    responses(
        (status = 200, description = "Grouped customer summaries", body = StdResponse<Vec<CustomerSummary>, String>)
    )
)]
async fn get_customers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let rows: Vec<OrderEntity> = orders::table
        .order_by(orders::created_at.asc())
        .get_results(conn)
        .await
        .context("Failed to get customer orders")?;

    Ok(StdResponse {
        data: Some(group_customers(rows)),
        message: Some("Get customers successfully"),
    })
}

/// Groups order rows into one customer entry per email, case-insensitively.
/// The first-seen row supplies the name/phone/address snapshot; totals and
/// date bounds aggregate over every row sharing the email.
fn group_customers(rows: Vec<OrderEntity>) -> Vec<CustomerSummary> {
    let mut grouped: HashMap<String, CustomerSummary> = HashMap::new();

    for row in rows {
        let key = row.email.to_lowercase();
        let entry = grouped.entry(key).or_insert_with(|| CustomerSummary {
            customer_name: row.customer_name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            address: row.address.clone(),
            city: row.city.clone(),
            total_spent: 0.0,
            total_orders: 0,
            latest_order_date: None,
            earliest_order_date: None,
            orders: Vec::new(),
        });

        entry.total_spent += row.order_cost + row.misc_fees;
        entry.total_orders += 1;
        entry.latest_order_date = Some(match entry.latest_order_date {
            Some(latest) if latest > row.created_at => latest,
            _ => row.created_at,
        });
        entry.earliest_order_date = Some(match entry.earliest_order_date {
            Some(earliest) if earliest < row.created_at => earliest,
            _ => row.created_at,
        });
        entry.orders.push(row);
    }

    let mut customers: Vec<CustomerSummary> = grouped.into_values().collect();
    customers.sort_by(|a, b| a.customer_name.cmp(&b.customer_name));
    customers
}
