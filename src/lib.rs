pub mod api;
pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod schema;
pub mod square;
pub mod store;
pub mod swagger;
