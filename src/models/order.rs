use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::CartSnapshot;

/// Immutable record of a completed checkout.
///
/// Orders are created exactly once per successful checkout and kept for the
/// lifetime of the process; nothing mutates or deletes them afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// The cart's items and pre-discount total at checkout time (deep copy,
    /// not a live reference).
    pub cart_snapshot: CartSnapshot,
    /// Pre-discount total.
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    /// `total_amount - discount_amount`.
    pub final_amount: Decimal,
    pub applied_coupon: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        cart_snapshot: CartSnapshot,
        discount_amount: Decimal,
        applied_coupon: Option<String>,
    ) -> Self {
        let total_amount = cart_snapshot.total;
        Self {
            id: Uuid::new_v4(),
            cart_snapshot,
            total_amount,
            discount_amount,
            final_amount: total_amount - discount_amount,
            applied_coupon,
            created_at: Utc::now(),
        }
    }

    /// Sum of line quantities, used for purchase metrics.
    pub fn items_purchased(&self) -> u64 {
        self.cart_snapshot
            .items
            .iter()
            .map(|i| i.quantity.max(0) as u64)
            .sum()
    }
}
