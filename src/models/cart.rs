use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A line in a shopping cart.
///
/// `unit_price` is captured from the catalog when the line is first created
/// and is never refreshed afterwards, even when the same product is added
/// again with a different live price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A mutable shopping cart scoped to a cart id.
///
/// Lines are keyed by product id (unique) and kept in insertion order.
/// The cart itself does not validate quantities; positivity is enforced by
/// `CartService` before any mutation reaches this type.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    /// Adds `quantity` of a product, merging into an existing line when the
    /// product is already present. The original snapshotted price wins on a
    /// merge; the `unit_price` argument only matters for a brand new line.
    ///
    /// Returns `false` (cart unchanged) when merging would overflow the line
    /// quantity.
    pub fn add_item(&mut self, product_id: &str, quantity: i32, unit_price: Decimal) -> bool {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            match existing.quantity.checked_add(quantity) {
                Some(merged) => {
                    existing.quantity = merged;
                    true
                }
                None => false,
            }
        } else {
            self.items.push(CartItem {
                product_id: product_id.to_string(),
                quantity,
                unit_price,
            });
            true
        }
    }

    /// Removes a line if present. Absent product ids are a silent no-op.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `quantity × unit_price` over all lines; zero for an empty cart.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Value copy of the cart for responses and order records. Mutating the
    /// returned snapshot never affects the live cart.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            id: self.id,
            items: self.items.clone(),
            total: self.total(),
        }
    }
}

/// Deep copy of a cart at a point in time, in line insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub id: Uuid,
    pub items: Vec<CartItem>,
    pub total: Decimal,
}
