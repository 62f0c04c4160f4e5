use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use bakery_orderservice::{app_state::AppState, bootstrap, config, db, routes, swagger};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = Arc::new(config::load()?);

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let state = AppState::new(config.clone()).await?;

    let routes = routes::checkout::routes_with_openapi()
        .merge(routes::payments::routes_with_openapi())
        .merge(routes::webhooks::routes_with_openapi())
        .merge(routes::orders::routes_with_openapi())
        .merge(routes::customers::routes_with_openapi())
        .merge(routes::emails::routes_with_openapi());

    let (router, mut openapi) = routes.split_for_parts();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Bakery OrderService API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi);

    let app = Router::new()
        .merge(router)
        .merge(swagger_ui)
        .with_state(state);

    bootstrap::serve("OrderService", app, &config.http.listen_addr).await
}
