//! Square payment-provider integration: REST client, webhook signature
//! verification and webhook event types.

pub mod client;
pub mod events;
pub mod signature;
pub mod types;

pub use client::{SquareApi, SquareClient, SquareError};
