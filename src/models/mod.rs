pub mod cart;
pub mod coupon;
pub mod metrics;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem, CartSnapshot};
pub use coupon::CouponState;
pub use metrics::{MetricsReport, StoreMetrics};
pub use order::Order;
pub use product::Product;
