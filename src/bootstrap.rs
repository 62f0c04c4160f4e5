use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}

pub fn init_env() {
    // Missing .env is fine in containerized deployments.
    dotenvy::dotenv().ok();
}

pub async fn serve(service_name: &str, app: Router, listen_addr: &str) -> Result<()> {
    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    tracing::info!("{} listening on {}", service_name, listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
