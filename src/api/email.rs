//! Transactional email through the Brevo SMTP API.

use reqwest::Client;
use serde::Serialize;

use crate::app_error::AppError;
use crate::config::EmailConfig;

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest {
    sender: Recipient,
    subject: String,
    html_content: String,
    message_versions: Vec<MessageVersion>,
}

#[derive(Serialize, Clone)]
struct Recipient {
    email: String,
    name: String,
}

#[derive(Serialize)]
struct MessageVersion {
    to: Vec<Recipient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
}

/// Sends an ad-hoc message to a customer, with a copy to the shop owner so
/// outbound mail is traceable. The body is sent as-is apart from newline
/// conversion; there is no templating here.
pub async fn send_customer_email(
    client: Client,
    config: &EmailConfig,
    to_email: &str,
    to_name: &str,
    body: &str,
) -> Result<(), AppError> {
    let api_key = config
        .brevo_api_key
        .as_deref()
        .ok_or_else(|| AppError::Config("BREVO_API_KEY is not set".into()))?;

    let html_content = body.replace("\r\n", "<br>").replace(['\r', '\n'], "<br>");

    let sender = Recipient {
        email: config.sender_email.clone(),
        name: config.sender_name.clone(),
    };
    let mut message_versions = vec![MessageVersion {
        to: vec![Recipient {
            email: to_email.to_string(),
            name: to_name.to_string(),
        }],
        subject: None,
    }];
    if let Some(support_email) = &config.support_email {
        message_versions.push(MessageVersion {
            to: vec![Recipient {
                email: support_email.clone(),
                name: config.sender_name.clone(),
            }],
            subject: Some(format!("You sent an email to {to_name}!")),
        });
    }

    let request = SendEmailRequest {
        sender,
        subject: format!("Message from {}", config.sender_name),
        html_content,
        message_versions,
    };

    let response = client
        .post(BREVO_SEND_URL)
        .header("api-key", api_key)
        .header("accept", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|_| AppError::ServiceUnreachable("Brevo".into()))?;

    let status = response.status();
    if !status.is_success() {
        let details = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream {
            message: "Failed to send email".into(),
            details,
        });
    }

    Ok(())
}
