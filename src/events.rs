use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted by the order pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// An order was durably recorded.
    OrderCreated(String),
    /// The durable store was unreachable and the order landed on the
    /// in-memory fallback list instead.
    OrderRecordedOffline(String),
    OrderStatusChanged {
        order_id: String,
        old_status: String,
        new_status: String,
    },
    OrderDeleted(String),
    ProductCreated(String),
    ProductDeleted(String),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failures to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event; a full or closed channel is logged and swallowed so
    /// event delivery never fails the request that produced it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!(error = %e, ?event, "Dropping event");
        }
    }
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderCreated(id) => info!(order_id = %id, "order created"),
            Event::OrderRecordedOffline(id) => {
                warn!(order_id = %id, "order recorded on in-memory fallback; it will not survive a restart")
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(%order_id, %old_status, %new_status, "order status changed"),
            Event::OrderDeleted(id) => info!(order_id = %id, "order deleted"),
            Event::ProductCreated(id) => info!(product_id = %id, "product created"),
            Event::ProductDeleted(id) => info!(product_id = %id, "product deleted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::OrderCreated("order-1".into()))
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, "order-1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out.
        sender.send_or_log(Event::OrderDeleted("gone".into())).await;
    }
}
