use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Events emitted by the services as side effects of store mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CartCreated(Uuid),
    CartItemAdded {
        cart_id: Uuid,
        product_id: String,
        quantity: i32,
    },
    CartItemRemoved {
        cart_id: Uuid,
        product_id: String,
    },
    OrderCreated(Uuid),
    CheckoutCompleted {
        cart_id: Uuid,
        order_id: Uuid,
    },
    CouponGenerated {
        code: String,
    },
    CouponConsumed {
        code: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs instead of failing when the receiver is gone.
    /// Event delivery is advisory; store mutations never depend on it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Event delivery failed: {}", e);
        }
    }
}

/// Drains the event channel and logs each event. Runs for the lifetime of
/// the process as a background task.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::CartCreated(cart_id) => info!("Cart created: {}", cart_id),
            Event::CartItemAdded {
                cart_id,
                product_id,
                quantity,
            } => info!(
                "Cart {}: added {} x{}",
                cart_id, product_id, quantity
            ),
            Event::CartItemRemoved {
                cart_id,
                product_id,
            } => info!("Cart {}: removed {}", cart_id, product_id),
            Event::OrderCreated(order_id) => info!("Order created: {}", order_id),
            Event::CheckoutCompleted { cart_id, order_id } => {
                info!("Checkout completed: cart {} -> order {}", cart_id, order_id)
            }
            Event::CouponGenerated { code } => info!("Coupon generated: {}", code),
            Event::CouponConsumed { code } => info!("Coupon consumed: {}", code),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let order_id = Uuid::new_v4();
        sender.send(Event::OrderCreated(order_id)).await.unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, order_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or return an error to the caller.
        sender
            .send_or_log(Event::CouponGenerated {
                code: "DISCOUNT-TEST".to_string(),
            })
            .await;
    }
}
