use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product. The catalog is seeded at startup and never mutated,
/// so products can be handed out by value without further coordination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}
