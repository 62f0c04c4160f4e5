//! Webhook event dispatch and order reconciliation.
//!
//! Square delivers webhooks at least once and possibly out of order. Both
//! flag updates are monotonic one-way flips, so duplicated or reordered
//! deliveries converge on the same state. Handler failures are logged and
//! swallowed here; the HTTP endpoint acknowledges every verified event so
//! Square does not retry conditions that retrying cannot fix.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use crate::square::SquareApi;
use crate::square::events::{PaymentObject, WebhookEvent, WebhookEventType};
use crate::square::types::COMPLETED;
use crate::store::OrderStore;

pub struct OrderReconciler {
    square: Arc<dyn SquareApi>,
    orders: Arc<dyn OrderStore>,
}

impl OrderReconciler {
    pub fn new(square: Arc<dyn SquareApi>, orders: Arc<dyn OrderStore>) -> Self {
        Self { square, orders }
    }

    /// Routes a verified event by type. Never fails: downstream errors are
    /// logged, not propagated.
    pub async fn handle_event(&self, event: WebhookEvent) {
        match event.typed() {
            WebhookEventType::PaymentCreated => {
                if let Some(payment) = event.data.object.payment {
                    info!(payment_id = %payment.id, "Payment created");
                }
            }
            WebhookEventType::PaymentUpdated => {
                if let Some(payment) = event.data.object.payment {
                    self.on_payment_updated(payment).await;
                }
            }
            WebhookEventType::OrderCreated => {
                if let Some(order) = event.data.object.order {
                    debug!(provider_order_id = %order.id, "Order created");
                }
            }
            WebhookEventType::OrderUpdated => {
                if let Some(order) = event.data.object.order {
                    debug!(
                        provider_order_id = %order.id,
                        state = order.state.as_deref().unwrap_or("unknown"),
                        "Order updated"
                    );
                }
            }
            WebhookEventType::Unknown => {
                info!(event_type = %event.event_type, "Unhandled event type");
            }
        }
    }

    async fn on_payment_updated(&self, payment: PaymentObject) {
        let status = payment.status.as_deref().unwrap_or("unknown");
        info!(payment_id = %payment.id, status, "Payment updated");

        if status != COMPLETED {
            return;
        }
        let Some(provider_order_id) = payment.order_id else {
            return;
        };

        if let Err(err) = self.reconcile(&provider_order_id).await {
            error!(%provider_order_id, "Failed to process payment completion: {err:#}");
        }
    }

    /// Fetches the Square order behind a completed payment, recovers the
    /// merchant `order_uid` from its reference field and flips the local
    /// payment and email-sent flags as two independent updates.
    pub async fn reconcile(&self, provider_order_id: &str) -> anyhow::Result<()> {
        let order = self
            .square
            .get_order(provider_order_id)
            .await
            .context("Failed to fetch Square order")?;

        let Some(order_uid) = order.reference_id else {
            // Correlation failure: nothing to match this order against. Drop
            // the event; a retry cannot succeed either.
            warn!(provider_order_id, "Square order carries no reference_id");
            return Ok(());
        };

        if self.orders.update_payment_status(&order_uid, true).await {
            info!(%order_uid, "Payment status updated");
        } else {
            error!(%order_uid, "Failed to update payment status");
        }

        if self.orders.update_email_sent_status(&order_uid, true).await {
            info!(%order_uid, "Email-sent status updated");
        } else {
            error!(%order_uid, "Failed to update email-sent status");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::square::SquareError;
    use crate::square::types::{CreatePaymentLinkRequest, PaymentLink, SquareOrder};

    struct FakeSquare {
        orders: HashMap<String, SquareOrder>,
        fail: bool,
    }

    #[async_trait]
    impl SquareApi for FakeSquare {
        async fn create_payment_link(
            &self,
            _request: &CreatePaymentLinkRequest,
        ) -> Result<PaymentLink, SquareError> {
            unimplemented!("not used by reconciliation")
        }

        async fn get_order(&self, order_id: &str) -> Result<SquareOrder, SquareError> {
            if self.fail {
                return Err(SquareError::Api {
                    status: 503,
                    message: "service unavailable".into(),
                });
            }
            self.orders
                .get(order_id)
                .cloned()
                .ok_or_else(|| SquareError::Api {
                    status: 404,
                    message: "order not found".into(),
                })
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl OrderStore for RecordingStore {
        async fn update_payment_status(&self, order_uid: &str, paid: bool) -> bool {
            assert!(paid);
            self.calls
                .lock()
                .unwrap()
                .push(("payment".into(), order_uid.into()));
            true
        }

        async fn update_email_sent_status(&self, order_uid: &str, sent: bool) -> bool {
            assert!(sent);
            self.calls
                .lock()
                .unwrap()
                .push(("email".into(), order_uid.into()));
            true
        }
    }

    fn square_order(reference_id: Option<&str>) -> SquareOrder {
        SquareOrder {
            id: "sq-order-1".into(),
            reference_id: reference_id.map(str::to_string),
            state: Some(COMPLETED.into()),
            ..SquareOrder::default()
        }
    }

    fn payment_updated_event(status: &str, order_id: Option<&str>) -> WebhookEvent {
        serde_json::from_value(serde_json::json!({
            "type": "payment.updated",
            "event_id": "evt-1",
            "data": {"object": {"payment": {
                "id": "pay-1",
                "status": status,
                "order_id": order_id,
            }}}
        }))
        .unwrap()
    }

    fn reconciler(square: FakeSquare, store: Arc<RecordingStore>) -> OrderReconciler {
        OrderReconciler::new(Arc::new(square), store)
    }

    #[tokio::test]
    async fn completed_payment_flips_both_flags() {
        let square = FakeSquare {
            orders: HashMap::from([("sq-order-1".into(), square_order(Some("uid-42")))]),
            fail: false,
        };
        let store = Arc::new(RecordingStore::default());
        let reconciler = reconciler(square, store.clone());

        reconciler
            .handle_event(payment_updated_event(COMPLETED, Some("sq-order-1")))
            .await;

        let calls = store.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("payment".to_string(), "uid-42".to_string()),
                ("email".to_string(), "uid-42".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_delivery_is_harmless() {
        let square = FakeSquare {
            orders: HashMap::from([("sq-order-1".into(), square_order(Some("uid-42")))]),
            fail: false,
        };
        let store = Arc::new(RecordingStore::default());
        let reconciler = reconciler(square, store.clone());

        reconciler
            .handle_event(payment_updated_event(COMPLETED, Some("sq-order-1")))
            .await;
        reconciler
            .handle_event(payment_updated_event(COMPLETED, Some("sq-order-1")))
            .await;

        // Both deliveries succeed; the second re-applies the same flips.
        assert_eq!(store.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn missing_reference_means_zero_mutations() {
        let square = FakeSquare {
            orders: HashMap::from([("sq-order-1".into(), square_order(None))]),
            fail: false,
        };
        let store = Arc::new(RecordingStore::default());
        let reconciler = reconciler(square, store.clone());

        reconciler
            .handle_event(payment_updated_event(COMPLETED, Some("sq-order-1")))
            .await;

        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn incomplete_payment_is_ignored() {
        let square = FakeSquare {
            orders: HashMap::from([("sq-order-1".into(), square_order(Some("uid-42")))]),
            fail: false,
        };
        let store = Arc::new(RecordingStore::default());
        let reconciler = reconciler(square, store.clone());

        reconciler
            .handle_event(payment_updated_event("PENDING", Some("sq-order-1")))
            .await;

        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn payment_without_order_id_is_ignored() {
        let square = FakeSquare {
            orders: HashMap::new(),
            fail: false,
        };
        let store = Arc::new(RecordingStore::default());
        let reconciler = reconciler(square, store.clone());

        reconciler
            .handle_event(payment_updated_event(COMPLETED, None))
            .await;

        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_swallowed() {
        let square = FakeSquare {
            orders: HashMap::new(),
            fail: true,
        };
        let store = Arc::new(RecordingStore::default());
        let reconciler = reconciler(square, store.clone());

        // Must not panic or mutate anything; the endpoint still acks.
        reconciler
            .handle_event(payment_updated_event(COMPLETED, Some("sq-order-1")))
            .await;

        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_event_type_is_ignored() {
        let square = FakeSquare {
            orders: HashMap::new(),
            fail: false,
        };
        let store = Arc::new(RecordingStore::default());
        let reconciler = reconciler(square, store.clone());

        let event: WebhookEvent =
            serde_json::from_str(r#"{"type": "dispute.created"}"#).unwrap();
        reconciler.handle_event(event).await;

        assert!(store.calls.lock().unwrap().is_empty());
    }
}
