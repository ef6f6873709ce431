//! The in-process state container.
//!
//! All mutable state (carts, orders, coupon slot, metrics) lives behind one
//! writer lock so a whole checkout executes as a single atomic sequence and
//! two concurrent checkouts of the same cart cannot both succeed. The catalog
//! and the Nth-order threshold are fixed at construction and sit outside the
//! lock.

use std::collections::HashMap;

use rust_decimal_macros::dec;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::models::{Cart, CouponState, MetricsReport, Order, Product, StoreMetrics};
use crate::services::coupons::CouponCodeGenerator;

/// Explicit shared state handle passed into each service constructor.
pub struct StateStore {
    catalog: HashMap<String, Product>,
    nth_order_threshold: u32,
    inner: Mutex<StoreInner>,
}

/// The mutable slices of the store, reachable only through the lock.
#[derive(Debug, Default)]
pub struct StoreInner {
    pub carts: HashMap<Uuid, Cart>,
    pub orders: HashMap<Uuid, Order>,
    pub coupon: CouponState,
    pub metrics: StoreMetrics,
}

impl StateStore {
    /// Builds a store with the default seed catalog.
    pub fn new(nth_order_threshold: u32) -> Self {
        Self::with_catalog(nth_order_threshold, seed_catalog())
    }

    /// Builds a store with an explicit catalog (primarily for tests).
    pub fn with_catalog(
        nth_order_threshold: u32,
        products: impl IntoIterator<Item = Product>,
    ) -> Self {
        let catalog = products.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            catalog,
            nth_order_threshold,
            inner: Mutex::new(StoreInner::default()),
        }
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.catalog.get(product_id)
    }

    /// All catalog products, ordered by id for stable listings.
    pub fn products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.catalog.values().cloned().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        products
    }

    pub fn nth_order_threshold(&self) -> u32 {
        self.nth_order_threshold
    }

    pub async fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().await
    }

    /// Read-only admin projection of metrics, coupon slot and threshold.
    pub async fn metrics_report(&self) -> MetricsReport {
        let inner = self.inner.lock().await;
        MetricsReport {
            metrics: inner.metrics.clone(),
            current_active_coupon_code: inner.coupon.active_code.clone(),
            is_coupon_available: inner.coupon.is_available,
            nth_order_threshold: self.nth_order_threshold,
        }
    }
}

impl StoreInner {
    /// Generates and installs a new coupon when the Nth-order condition holds:
    /// at least one order processed and the order count a multiple of
    /// `threshold`. Installing overwrites any prior unconsumed code, so at
    /// most one coupon is ever pending. Returns `None` (and touches nothing)
    /// when the condition fails.
    ///
    /// Shared by the order-triggered and admin-triggered generation paths so
    /// both honor the same single-active-code invariant.
    pub fn generate_coupon_if_eligible(
        &mut self,
        threshold: u32,
        generator: &dyn CouponCodeGenerator,
    ) -> Option<String> {
        let processed = self.metrics.total_orders_processed;
        if processed == 0 || processed % u64::from(threshold.max(1)) != 0 {
            return None;
        }

        let code = generator.generate();
        self.coupon.active_code = Some(code.clone());
        self.coupon.is_available = true;
        self.metrics.all_generated_coupon_codes.push(code.clone());
        Some(code)
    }

    /// One-time consumption: true iff `code` is non-empty, matches the active
    /// code and the slot is still available. A hit clears the slot; any miss
    /// leaves state untouched. There is no rollback once consumed.
    pub fn validate_and_consume_coupon(&mut self, code: &str) -> bool {
        let matches = !code.is_empty()
            && self.coupon.is_available
            && self.coupon.active_code.as_deref() == Some(code);

        if matches {
            self.coupon.active_code = None;
            self.coupon.is_available = false;
        }
        matches
    }
}

fn seed_catalog() -> Vec<Product> {
    vec![
        Product::new("product1", "Laptop", dec!(1200.00)),
        Product::new("product2", "Mouse", dec!(25.50)),
        Product::new("product3", "Keyboard", dec!(75.00)),
        Product::new("product4", "Monitor", dec!(300.00)),
        Product::new("product5", "Webcam", dec!(50.00)),
    ]
}
