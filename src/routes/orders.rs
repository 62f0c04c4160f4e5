use anyhow::Context;
use axum::{extract::State, response::IntoResponse};
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
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
        OpenApiRouter::new().routes(utoipa_axum::routes!(get_orders)),
    )
}

/// Fetch all orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    tags = ["Orders"],
    responses(
        (status = 200, description = "List all orders", body = StdResponse<Vec<OrderEntity>, String>)
    )
)]
async fn get_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let orders: Vec<OrderEntity> = orders::table
        .order_by(orders::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get orders")?;

    Ok(StdResponse {
        data: Some(orders),
        message: Some("Get orders successfully"),
    })
}
