use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Running aggregates derived solely from completed checkouts and coupon
/// generation. Counters only ever grow; nothing decrements them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreMetrics {
    pub total_items_purchased: u64,
    /// Sum of final amounts after discount.
    pub total_purchase_amount: Decimal,
    /// Sum of all discounts given.
    pub total_discount_amount: Decimal,
    /// Count of successful checkouts.
    pub total_orders_processed: u64,
    /// History of every code ever generated, in generation order.
    pub all_generated_coupon_codes: Vec<String>,
}

impl StoreMetrics {
    /// Folds one successful checkout into the aggregates.
    pub fn record_checkout(
        &mut self,
        items_purchased: u64,
        final_amount: Decimal,
        discount_amount: Decimal,
    ) {
        self.total_items_purchased += items_purchased;
        self.total_purchase_amount += final_amount;
        self.total_discount_amount += discount_amount;
        self.total_orders_processed += 1;
    }
}

/// Read-only admin projection: the metrics plus the current coupon slot and
/// the configured threshold.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    #[serde(flatten)]
    pub metrics: StoreMetrics,
    pub current_active_coupon_code: Option<String>,
    pub is_coupon_available: bool,
    pub nth_order_threshold: u32,
}
