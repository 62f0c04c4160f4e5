use anyhow::Context;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::AppError,
    app_state::AppState,
    config::SquareConfig,
    square::{events::WebhookEvent, signature},
};

pub const SIGNATURE_HEADER: &str = "x-square-hmacsha256-signature";

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/api/webhooks",
        OpenApiRouter::new().routes(utoipa_axum::routes!(square_webhook)),
    )
}

#[derive(Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

/// Square webhook receiver. Verification first, then an unconditional 200:
/// once the signature checks out, every event is acknowledged regardless of
/// handler outcome so Square does not retry deliveries that only operator
/// action can fix.
#[utoipa::path(
    post,
    path = "/square",
    tags = ["Webhooks"],
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 401, description = "Missing or invalid signature"),
        (status = 500, description = "Missing server configuration or processing failure")
    )
)]
async fn square_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    check_signature(&headers, &state.config.square, &body)?;

    let event: WebhookEvent =
        serde_json::from_slice(&body).context("Failed to parse webhook payload")?;
    tracing::info!(event_type = %event.event_type, "Webhook received");

    state.reconciler.handle_event(event).await;

    Ok(Json(WebhookAck { received: true }))
}

/// Gate on the raw request bytes. Missing header is an auth failure; missing
/// server-side key or notification URL is a configuration failure.
fn check_signature(
    headers: &HeaderMap,
    config: &SquareConfig,
    raw_body: &[u8],
) -> Result<(), AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing signature header".into()))?;

    let signature_key = config
        .webhook_signature_key
        .as_deref()
        .ok_or_else(|| AppError::Config("SQUARE_WEBHOOK_SIGNATURE_KEY is not set".into()))?;
    let notification_url = config
        .webhook_notification_url
        .as_deref()
        .ok_or_else(|| AppError::Config("SQUARE_WEBHOOK_NOTIFICATION_URL is not set".into()))?;

    if !signature::verify(raw_body, signature, signature_key, notification_url) {
        tracing::warn!("Invalid webhook signature");
        return Err(AppError::Unauthorized("Invalid signature".into()));
    }

    Ok(())
}
