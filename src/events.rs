use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted by the services after a successful commit. Advisory
/// only: delivery failures are logged and never propagated to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ProductCreated(i32),
    ProductUpdated(i32),
    ProductDeleted(i32),
    StockReceived {
        product_id: i32,
        quantity: i32,
        request_id: Option<i32>,
    },
    StockIssued {
        product_id: i32,
        dept_id: i32,
        quantity: i32,
    },
    PurchaseRequestCreated {
        request_id: i32,
        request_qr: String,
    },
    PurchaseRequestItemReceived {
        item_id: i32,
        cumulative_qty: i32,
        requested_qty: i32,
    },
    PurchaseRequestCompleted(i32),
    PurchaseRequestDeleted(i32),
    ConsumptionFlagged {
        product_id: i32,
        dept_id: i32,
        quantity: i32,
    },
    ConsumptionAlertDismissed(i32),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, failing if the channel is closed or full.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging on failure instead of surfacing it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event delivery failed: {}", e);
        }
    }
}

/// Background consumer for the event channel. Currently logs each event;
/// downstream integrations (notifications, exports) hang off this loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(event = ?event, "Domain event");
    }
}
