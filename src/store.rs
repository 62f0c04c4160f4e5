use async_trait::async_trait;
use diesel::ExpressionMethods;
use diesel_async::RunQueryDsl;

use crate::db::DbPool;
use crate::schema::orders;

/// Durable order-flag updates consumed by the reconciliation path. Both
/// operations are idempotent monotonic flips and report success as a plain
/// boolean instead of an error: a failed update is logged and the webhook is
/// acknowledged anyway.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn update_payment_status(&self, order_uid: &str, paid: bool) -> bool;
    async fn update_email_sent_status(&self, order_uid: &str, sent: bool) -> bool;
}

pub struct PgOrderStore {
    db_pool: DbPool,
}

impl PgOrderStore {
    pub fn new(db_pool: DbPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn update_payment_status(&self, order_uid: &str, paid: bool) -> bool {
        let conn = &mut match self.db_pool.get().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::error!(order_uid, "Failed to obtain a DB connection: {err}");
                return false;
            }
        };

        // No `is_paid = false` filter: re-applying the same flip must succeed
        // so duplicate webhook deliveries stay harmless.
        let updated = diesel::update(orders::table)
            .filter(orders::order_uid.eq(order_uid))
            .set(orders::is_paid.eq(paid))
            .execute(conn)
            .await;

        match updated {
            Ok(0) => {
                tracing::warn!(order_uid, "No order matches this order_uid");
                false
            }
            Ok(_) => true,
            Err(err) => {
                tracing::error!(order_uid, "Failed to update payment status: {err}");
                false
            }
        }
    }

    async fn update_email_sent_status(&self, order_uid: &str, sent: bool) -> bool {
        let conn = &mut match self.db_pool.get().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::error!(order_uid, "Failed to obtain a DB connection: {err}");
                return false;
            }
        };

        let updated = diesel::update(orders::table)
            .filter(orders::order_uid.eq(order_uid))
            .set(orders::email_sent.eq(sent))
            .execute(conn)
            .await;

        match updated {
            Ok(0) => {
                tracing::warn!(order_uid, "No order matches this order_uid");
                false
            }
            Ok(_) => true,
            Err(err) => {
                tracing::error!(order_uid, "Failed to update email-sent status: {err}");
                false
            }
        }
    }
}
