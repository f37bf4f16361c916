use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a mutating operation commits. Consumers are
/// decoupled from the request path; a failed send never fails the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CheckoutCompleted {
        transaction_id: Uuid,
        location_id: Uuid,
        total_amount: Decimal,
    },
    StockAdjusted {
        product_id: Uuid,
        location_id: Uuid,
        delta: i32,
        new_quantity: i32,
    },
    StockTransferred {
        product_id: Uuid,
        from_location_id: Uuid,
        to_location_id: Uuid,
        quantity: i32,
    },
    WebhookOrderFulfilled {
        transaction_id: Uuid,
        order_id: String,
        source: String,
        fulfilled_lines: usize,
        skipped_lines: usize,
    },
    ProductCreated(Uuid),
    ProductReviewed {
        product_id: Uuid,
        status: String,
    },
    CustomerCreated(Uuid),
    LocationCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget publish for post-commit notifications.
    pub async fn publish(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!(error = %err, "event channel unavailable, dropping event");
        }
    }
}

/// Consumes events from the channel and logs them. Runs until every sender
/// is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::CheckoutCompleted {
                transaction_id,
                location_id,
                total_amount,
            } => info!(
                %transaction_id,
                %location_id,
                %total_amount,
                "checkout completed"
            ),
            Event::StockAdjusted {
                product_id,
                location_id,
                delta,
                new_quantity,
            } => info!(
                %product_id,
                %location_id,
                delta,
                new_quantity,
                "stock adjusted"
            ),
            Event::StockTransferred {
                product_id,
                from_location_id,
                to_location_id,
                quantity,
            } => info!(
                %product_id,
                %from_location_id,
                %to_location_id,
                quantity,
                "stock transferred"
            ),
            Event::WebhookOrderFulfilled {
                transaction_id,
                order_id,
                source,
                fulfilled_lines,
                skipped_lines,
            } => info!(
                %transaction_id,
                order_id,
                source,
                fulfilled_lines,
                skipped_lines,
                "webhook order fulfilled"
            ),
            other => info!(event = ?other, "event"),
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_does_not_fail_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out.
        sender.publish(Event::ProductCreated(Uuid::new_v4())).await;
    }

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::CustomerCreated(Uuid::new_v4()))
            .await
            .expect("send should succeed");
        assert!(matches!(rx.recv().await, Some(Event::CustomerCreated(_))));
    }
}
