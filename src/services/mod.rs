pub mod carts;
pub mod checkout;
pub mod coupons;
pub mod products;

pub use carts::CartService;
pub use checkout::CheckoutService;
pub use coupons::CouponService;
pub use products::ProductService;
