use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::Config;
use crate::db::{self, DbPool};
use crate::reconcile::OrderReconciler;
use crate::square::{SquareApi, SquareClient};
use crate::store::{OrderStore, PgOrderStore};

/// Bound on provider/email HTTP calls; nothing in this service should wait on
/// a collaborator longer than this.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub http_client: reqwest::Client,
    pub square: Arc<dyn SquareApi>,
    pub reconciler: Arc<OrderReconciler>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Arc<Config>) -> Result<Self> {
        let db_pool = db::create_pool(&config.database.url).await?;
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;

        let square: Arc<dyn SquareApi> =
            Arc::new(SquareClient::new(http_client.clone(), &config.square));
        let orders: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(db_pool.clone()));
        let reconciler = Arc::new(OrderReconciler::new(square.clone(), orders));

        Ok(Self {
            db_pool,
            http_client,
            square,
            reconciler,
            config,
        })
    }
}
