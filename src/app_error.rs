use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Application-wide error type. Every route handler returns
/// `Result<impl IntoResponse, AppError>` and relies on the mapping below to
/// produce a `{error, details?}` JSON body with the right status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Resource not found")]
    NotFound,
    /// Client input error; the message names the offending field.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    /// Missing server-side configuration. The real cause is logged and never
    /// echoed to the client.
    #[error("Server configuration error")]
    Config(String),
    #[error("{0} is unreachable")]
    ServiceUnreachable(String),
    /// A collaborator rejected the request; its message is passed through in
    /// `details` so the caller can see what the provider said.
    #[error("{message}")]
    Upstream { message: String, details: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".into(), None),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message, None),
            AppError::Config(cause) => {
                tracing::error!("Configuration error: {cause}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".into(),
                    None,
                )
            }
            AppError::ServiceUnreachable(service) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{service} is unreachable"),
                None,
            ),
            AppError::Upstream { message, details } => {
                tracing::error!("Upstream error: {message}: {details}");
                (StatusCode::INTERNAL_SERVER_ERROR, message, Some(details))
            }
            AppError::Other(err) => {
                tracing::error!("Unhandled error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                    None,
                )
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

/// Standard `{data, message}` envelope for staff-facing endpoints.
#[derive(Serialize, ToSchema)]
pub struct StdResponse<T: Serialize, M: Serialize> {
    pub data: Option<T>,
    pub message: Option<M>,
}

impl<T: Serialize, M: Serialize> IntoResponse for StdResponse<T, M> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_401() {
        let res = AppError::Unauthorized("Invalid signature".into()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let res = AppError::BadRequest("Customer email is required".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_error_maps_to_500() {
        let res = AppError::Config("SQUARE_WEBHOOK_SIGNATURE_KEY is not set".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
