use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::app_error::AppError;
use crate::config::SquareConfig;
use crate::square::types::{CreatePaymentLinkRequest, CreatePaymentLinkResponse, GetOrderResponse, PaymentLink, SquareOrder};

const SQUARE_VERSION: &str = "2025-01-23";

#[derive(Debug, Error)]
pub enum SquareError {
    /// Missing credentials; fixed by an operator, never retried.
    #[error("{0}")]
    Config(String),
    #[error("Square request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Square rejected the request; `message` carries its error details.
    #[error("{message}")]
    Api { status: u16, message: String },
}

impl From<SquareError> for AppError {
    fn from(err: SquareError) -> Self {
        match err {
            SquareError::Config(cause) => AppError::Config(cause),
            SquareError::Http(err) => AppError::Upstream {
                message: "Square request failed".into(),
                details: err.to_string(),
            },
            SquareError::Api { message, .. } => AppError::Upstream {
                message: "Square rejected the request".into(),
                details: message,
            },
        }
    }
}

/// Seam over the Square API so the reconciliation path can be exercised with
/// an in-memory double instead of the network.
#[async_trait]
pub trait SquareApi: Send + Sync {
    async fn create_payment_link(
        &self,
        request: &CreatePaymentLinkRequest,
    ) -> Result<PaymentLink, SquareError>;

    async fn get_order(&self, order_id: &str) -> Result<SquareOrder, SquareError>;
}

pub struct SquareClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl SquareClient {
    pub fn new(http: reqwest::Client, config: &SquareConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn token(&self) -> Result<&str, SquareError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| SquareError::Config("SQUARE_ACCESS_TOKEN is not set".into()))
    }
}

#[async_trait]
impl SquareApi for SquareClient {
    async fn create_payment_link(
        &self,
        request: &CreatePaymentLinkRequest,
    ) -> Result<PaymentLink, SquareError> {
        let token = self.token()?;
        let response = self
            .http
            .post(format!("{}/v2/online-checkout/payment-links", self.base_url))
            .bearer_auth(token)
            .header("Square-Version", SQUARE_VERSION)
            .json(request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: CreatePaymentLinkResponse = response.json().await?;
        Ok(body.payment_link)
    }

    async fn get_order(&self, order_id: &str) -> Result<SquareOrder, SquareError> {
        let token = self.token()?;
        let response = self
            .http
            .get(format!("{}/v2/orders/{}", self.base_url, order_id))
            .bearer_auth(token)
            .header("Square-Version", SQUARE_VERSION)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: GetOrderResponse = response.json().await?;
        Ok(body.order)
    }
}

#[derive(Debug, Deserialize)]
struct SquareErrorBody {
    #[serde(default)]
    errors: Vec<SquareErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct SquareErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SquareError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<SquareErrorBody>().await {
        Ok(body) if !body.errors.is_empty() => body
            .errors
            .into_iter()
            .map(|err| match (err.code, err.detail) {
                (Some(code), Some(detail)) => format!("{code}: {detail}"),
                (Some(code), None) => code,
                (None, Some(detail)) => detail,
                (None, None) => "unknown error".to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => format!("HTTP {status}"),
    };

    Err(SquareError::Api {
        status: status.as_u16(),
        message,
    })
}
