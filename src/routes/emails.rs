use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    api::email::send_customer_email,
    app_error::{AppError, StdResponse},
    app_state::AppState,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/api",
        OpenApiRouter::new().routes(utoipa_axum::routes!(send_email)),
    )
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SendCustomerEmailReq {
    pub customer_data: CustomerData,
    #[serde(default)]
    pub email_body: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CustomerData {
    pub email: String,
    pub customer_name: String,
}

/// Send an ad-hoc email to a customer.
#[utoipa::path(
    post,
    path = "/send-customer-email",
    tags = ["Customers"],
    request_body = SendCustomerEmailReq,
    responses(
        (status = 200, description = "Email sent", body = StdResponse<String, String>),
        (status = 400, description = "Missing recipient email"),
        (status = 500, description = "Missing email credentials or send failure")
    )
)]
async fn send_email(
    State(state): State<AppState>,
    Json(body): Json<SendCustomerEmailReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.customer_data.email.is_empty() {
        return Err(AppError::BadRequest("Recipient email is required".into()));
    }

    send_customer_email(
        state.http_client.clone(),
        &state.config.email,
        &body.customer_data.email,
        &body.customer_data.customer_name,
        &body.email_body,
    )
    .await?;

    tracing::info!(to = %body.customer_data.email, "Customer email sent");

    Ok(StdResponse::<String, _> {
        data: None,
        message: Some("Email sent"),
    })
}
