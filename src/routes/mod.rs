pub mod checkout;
pub mod customers;
pub mod emails;
pub mod orders;
pub mod payments;
pub mod webhooks;
