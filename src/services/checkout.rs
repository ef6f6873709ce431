use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::Order,
    services::coupons::CouponCodeGenerator,
    store::StateStore,
};

/// Fixed discount rate applied when a coupon is accepted.
const COUPON_DISCOUNT_RATE: Decimal = dec!(0.10);

/// Input for the checkout workflow.
#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    pub cart_id: Uuid,
    pub coupon_code: Option<String>,
}

/// The checkout workflow: converts a cart into an immutable order, applies
/// at most one discount, updates the running metrics, removes the cart, and
/// triggers Nth-order coupon regeneration.
///
/// The whole workflow runs under a single store lock acquisition, so two
/// simultaneous checkouts of the same cart cannot both pass the emptiness
/// check.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<StateStore>,
    event_sender: Arc<EventSender>,
    code_generator: Arc<dyn CouponCodeGenerator>,
}

impl CheckoutService {
    pub fn new(
        store: Arc<StateStore>,
        event_sender: Arc<EventSender>,
        code_generator: Arc<dyn CouponCodeGenerator>,
    ) -> Self {
        Self {
            store,
            event_sender,
            code_generator,
        }
    }

    /// Processes the checkout for a given cart.
    ///
    /// An invalid, expired or already-used coupon is not an error: the
    /// checkout proceeds with zero discount. Callers cannot distinguish "no
    /// coupon given" from "bad coupon given" on the resulting order; both
    /// leave `applied_coupon` empty.
    #[instrument(skip(self))]
    pub async fn checkout(&self, input: CheckoutInput) -> Result<Order, ServiceError> {
        let mut inner = self.store.lock().await;

        // Both preconditions are checked before any mutation.
        let cart = inner
            .carts
            .get(&input.cart_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", input.cart_id)))?;
        if cart.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Cannot checkout an empty cart".to_string(),
            ));
        }

        let snapshot = cart.snapshot();
        let original_total = snapshot.total;

        let mut discount_amount = Decimal::ZERO;
        let mut applied_coupon = None;
        let mut consumed_code = None;
        if let Some(code) = input.coupon_code.as_deref() {
            // Consumption is irreversible; no rollback path exists.
            if inner.validate_and_consume_coupon(code) {
                discount_amount = original_total * COUPON_DISCOUNT_RATE;
                applied_coupon = Some(code.to_string());
                consumed_code = Some(code.to_string());
                info!("Discount {} applied with coupon {}", discount_amount, code);
            } else {
                warn!(
                    "Invalid or already used coupon code: {}; no discount applied",
                    code
                );
            }
        }

        let order = Order::new(snapshot, discount_amount, applied_coupon);
        inner.orders.insert(order.id, order.clone());

        inner.metrics.record_checkout(
            order.items_purchased(),
            order.final_amount,
            order.discount_amount,
        );

        // The cart is gone for good; re-checkout of the same id needs a new
        // cart first.
        inner.carts.remove(&input.cart_id);

        // Fire-and-forget: a freshly generated code is not attached to this
        // order, it becomes available for a future checkout.
        let new_code = inner.generate_coupon_if_eligible(
            self.store.nth_order_threshold(),
            self.code_generator.as_ref(),
        );
        drop(inner);

        if let Some(code) = consumed_code {
            self.event_sender
                .send_or_log(Event::CouponConsumed { code })
                .await;
        }
        self.event_sender
            .send_or_log(Event::OrderCreated(order.id))
            .await;
        self.event_sender
            .send_or_log(Event::CheckoutCompleted {
                cart_id: input.cart_id,
                order_id: order.id,
            })
            .await;
        if let Some(code) = new_code {
            info!("Nth order condition met, new coupon generated: {}", code);
            self.event_sender
                .send_or_log(Event::CouponGenerated { code })
                .await;
        }

        info!(
            "Order {} placed successfully, final amount: {}",
            order.id, order.final_amount
        );
        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        let inner = self.store.lock().await;
        inner
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    /// All orders, oldest first.
    pub async fn list_orders(&self) -> Vec<Order> {
        let inner = self.store.lock().await;
        let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::carts::{AddItemInput, CartService, CreateCartInput};
    use crate::services::coupons::CouponService;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::mpsc;

    struct SequentialCodes(AtomicU64);

    impl CouponCodeGenerator for SequentialCodes {
        fn generate(&self) -> String {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            format!("DISCOUNT-TEST{}", n)
        }
    }

    struct Fixture {
        store: Arc<StateStore>,
        carts: CartService,
        coupons: CouponService,
        checkout: CheckoutService,
    }

    fn fixture(threshold: u32) -> Fixture {
        let (tx, _rx) = mpsc::channel(64);
        let event_sender = Arc::new(EventSender::new(tx));
        let store = Arc::new(StateStore::new(threshold));
        let generator: Arc<dyn CouponCodeGenerator> =
            Arc::new(SequentialCodes(AtomicU64::new(0)));

        Fixture {
            store: store.clone(),
            carts: CartService::new(store.clone(), event_sender.clone()),
            coupons: CouponService::with_generator(
                store.clone(),
                event_sender.clone(),
                generator.clone(),
            ),
            checkout: CheckoutService::new(store, event_sender, generator),
        }
    }

    async fn cart_with_items(fx: &Fixture, lines: &[(&str, i32)]) -> Uuid {
        let cart = fx
            .carts
            .create_cart(CreateCartInput::default())
            .await
            .unwrap();
        for (product_id, quantity) in lines {
            fx.carts
                .add_item(
                    cart.id,
                    AddItemInput {
                        product_id: product_id.to_string(),
                        quantity: *quantity,
                    },
                )
                .await
                .unwrap();
        }
        cart.id
    }

    #[tokio::test]
    async fn checkout_rejects_unknown_cart() {
        let fx = fixture(3);
        assert_matches!(
            fx.checkout
                .checkout(CheckoutInput {
                    cart_id: Uuid::new_v4(),
                    coupon_code: None,
                })
                .await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn checkout_rejects_empty_cart() {
        let fx = fixture(3);
        let cart = fx
            .carts
            .create_cart(CreateCartInput::default())
            .await
            .unwrap();

        assert_matches!(
            fx.checkout
                .checkout(CheckoutInput {
                    cart_id: cart.id,
                    coupon_code: Some("DISCOUNT-ANY".to_string()),
                })
                .await,
            Err(ServiceError::InvalidOperation(_))
        );

        // Precondition failure mutates nothing.
        assert!(fx.carts.get_cart(cart.id).await.is_ok());
        assert_eq!(
            fx.store.lock().await.metrics.total_orders_processed,
            0
        );
    }

    #[tokio::test]
    async fn checkout_without_coupon_updates_metrics_and_removes_cart() {
        let fx = fixture(3);
        // Webcam (50.00) x2 -> total 100.00
        let cart_id = cart_with_items(&fx, &[("product5", 2)]).await;

        let order = fx
            .checkout
            .checkout(CheckoutInput {
                cart_id,
                coupon_code: None,
            })
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec!(100.00));
        assert_eq!(order.discount_amount, Decimal::ZERO);
        assert_eq!(order.final_amount, dec!(100.00));
        assert!(order.applied_coupon.is_none());

        assert_matches!(
            fx.carts.get_cart(cart_id).await,
            Err(ServiceError::NotFound(_))
        );

        let inner = fx.store.lock().await;
        assert_eq!(inner.metrics.total_orders_processed, 1);
        assert_eq!(inner.metrics.total_items_purchased, 2);
        assert_eq!(inner.metrics.total_purchase_amount, dec!(100.00));
        assert!(inner.orders.contains_key(&order.id));
    }

    #[tokio::test]
    async fn valid_coupon_applies_ten_percent() {
        let fx = fixture(1);

        // First checkout makes the order count a threshold multiple, which
        // installs a coupon for the next one.
        let first = cart_with_items(&fx, &[("product5", 1)]).await;
        fx.checkout
            .checkout(CheckoutInput {
                cart_id: first,
                coupon_code: None,
            })
            .await
            .unwrap();
        let code = fx.coupons.status().await.active_code.unwrap();

        let second = cart_with_items(&fx, &[("product1", 2)]).await; // 2400.00
        let order = fx
            .checkout
            .checkout(CheckoutInput {
                cart_id: second,
                coupon_code: Some(code.clone()),
            })
            .await
            .unwrap();

        assert_eq!(order.total_amount, dec!(2400.00));
        assert_eq!(order.discount_amount, dec!(240.00));
        assert_eq!(order.final_amount, dec!(2160.00));
        assert_eq!(order.applied_coupon.as_deref(), Some(code.as_str()));

        let inner = fx.store.lock().await;
        assert_eq!(inner.metrics.total_discount_amount, dec!(240.00));
    }

    #[tokio::test]
    async fn invalid_coupon_degrades_silently() {
        let fx = fixture(3);
        let cart_id = cart_with_items(&fx, &[("product3", 1)]).await; // 75.00

        let order = fx
            .checkout
            .checkout(CheckoutInput {
                cart_id,
                coupon_code: Some("DISCOUNT-BOGUS".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(order.discount_amount, Decimal::ZERO);
        assert_eq!(order.final_amount, dec!(75.00));
        assert!(order.applied_coupon.is_none());
    }

    #[tokio::test]
    async fn coupon_generation_follows_threshold_cadence() {
        let fx = fixture(3);

        for n in 1..=6u64 {
            let cart_id = cart_with_items(&fx, &[("product5", 1)]).await;
            fx.checkout
                .checkout(CheckoutInput {
                    cart_id,
                    coupon_code: None,
                })
                .await
                .unwrap();

            let generated = fx
                .store
                .lock()
                .await
                .metrics
                .all_generated_coupon_codes
                .len();
            let expected = match n {
                1 | 2 => 0,
                3 | 4 | 5 => 1,
                _ => 2,
            };
            assert_eq!(generated, expected, "after checkout {}", n);
        }
    }

    #[tokio::test]
    async fn order_snapshot_survives_cart_removal() {
        let fx = fixture(3);
        let cart_id = cart_with_items(&fx, &[("product2", 3), ("product4", 1)]).await;

        let order = fx
            .checkout
            .checkout(CheckoutInput {
                cart_id,
                coupon_code: None,
            })
            .await
            .unwrap();

        let fetched = fx.checkout.get_order(order.id).await.unwrap();
        assert_eq!(fetched.cart_snapshot.items.len(), 2);
        assert_eq!(fetched.cart_snapshot.total, dec!(376.50));
        assert_eq!(fx.checkout.list_orders().await.len(), 1);

        assert_matches!(
            fx.checkout.get_order(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
