pub mod admin;
pub mod carts;
pub mod checkout;
pub mod common;
pub mod health;
pub mod orders;
pub mod products;

use std::sync::Arc;

use crate::events::EventSender;
use crate::services::coupons::{CouponCodeGenerator, RandomCodeGenerator};
use crate::services::{CartService, CheckoutService, CouponService, ProductService};
use crate::store::StateStore;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub carts: Arc<CartService>,
    pub coupons: Arc<CouponService>,
    pub checkout: Arc<CheckoutService>,
}

impl AppServices {
    /// Build the default services container with the random coupon code
    /// generator.
    pub fn new(store: Arc<StateStore>, event_sender: Arc<EventSender>) -> Self {
        Self::with_code_generator(store, event_sender, Arc::new(RandomCodeGenerator))
    }

    /// Build the services container with an explicit code generator. The
    /// coupon and checkout services share the generator so the admin- and
    /// order-triggered paths issue codes from the same source.
    pub fn with_code_generator(
        store: Arc<StateStore>,
        event_sender: Arc<EventSender>,
        code_generator: Arc<dyn CouponCodeGenerator>,
    ) -> Self {
        let products = Arc::new(ProductService::new(store.clone()));
        let carts = Arc::new(CartService::new(store.clone(), event_sender.clone()));
        let coupons = Arc::new(CouponService::with_generator(
            store.clone(),
            event_sender.clone(),
            code_generator.clone(),
        ));
        let checkout = Arc::new(CheckoutService::new(store, event_sender, code_generator));

        Self {
            products,
            carts,
            coupons,
            checkout,
        }
    }
}
