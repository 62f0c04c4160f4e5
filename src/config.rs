use anyhow::{Context, Result};

const SQUARE_PRODUCTION_URL: &str = "https://connect.squareup.com";
const SQUARE_SANDBOX_URL: &str = "https://connect.squareupsandbox.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub square: SquareConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub listen_addr: String,
    /// Externally-visible base URL, used for checkout redirect links.
    pub base_url: String,
}

/// Square credentials are optional at boot; endpoints that need a missing
/// value respond with a configuration error instead of failing startup.
#[derive(Debug, Clone)]
pub struct SquareConfig {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub location_id: Option<String>,
    pub webhook_signature_key: Option<String>,
    /// Must exactly match the notification URL registered with Square,
    /// scheme, host and path included; it is part of the signed message.
    pub webhook_notification_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub brevo_api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
    pub support_email: Option<String>,
}

pub fn load() -> Result<Config> {
    let api_base_url = match std::env::var("SQUARE_ENVIRONMENT").as_deref() {
        Ok("production") => SQUARE_PRODUCTION_URL,
        _ => SQUARE_SANDBOX_URL,
    }
    .to_string();

    Ok(Config {
        database: DatabaseConfig {
            url: std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?,
        },
        http: HttpConfig {
            listen_addr: env_or("LISTEN_ADDR", "0.0.0.0:3000"),
            base_url: env_or("BASE_URL", "http://localhost:3000"),
        },
        square: SquareConfig {
            api_base_url,
            access_token: env_opt("SQUARE_ACCESS_TOKEN"),
            location_id: env_opt("SQUARE_LOCATION_ID"),
            webhook_signature_key: env_opt("SQUARE_WEBHOOK_SIGNATURE_KEY"),
            webhook_notification_url: env_opt("SQUARE_WEBHOOK_NOTIFICATION_URL"),
        },
        email: EmailConfig {
            brevo_api_key: env_opt("BREVO_API_KEY"),
            sender_email: env_or("SENDER_EMAIL", "orders@bakery.local"),
            sender_name: env_or("SENDER_NAME", "Bakery Orders"),
            support_email: env_opt("SUPPORT_EMAIL"),
        },
    })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
