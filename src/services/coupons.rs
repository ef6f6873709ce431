use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info, instrument};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::CouponState,
    store::StateStore,
};

/// Produces discount codes. Injectable so tests can supply a deterministic
/// generator instead of patching the service.
pub trait CouponCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Default generator: `DISCOUNT-` plus a short random alphanumeric token.
pub struct RandomCodeGenerator;

impl CouponCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        format!("DISCOUNT-{}", token.to_uppercase())
    }
}

/// Coupon issuer: owns the single active coupon slot.
///
/// Issuance is decoupled from checkout amounts so the admin-triggered and
/// order-triggered paths share one code path and one invariant: a single
/// active code, consumed at most once.
#[derive(Clone)]
pub struct CouponService {
    store: Arc<StateStore>,
    event_sender: Arc<EventSender>,
    generator: Arc<dyn CouponCodeGenerator>,
}

impl CouponService {
    pub fn new(store: Arc<StateStore>, event_sender: Arc<EventSender>) -> Self {
        Self::with_generator(store, event_sender, Arc::new(RandomCodeGenerator))
    }

    pub fn with_generator(
        store: Arc<StateStore>,
        event_sender: Arc<EventSender>,
        generator: Arc<dyn CouponCodeGenerator>,
    ) -> Self {
        Self {
            store,
            event_sender,
            generator,
        }
    }

    /// Generates a new coupon when the Nth-order condition holds; `None`
    /// (with no state change) otherwise.
    #[instrument(skip(self))]
    pub async fn generate_if_eligible(&self) -> Option<String> {
        let threshold = self.store.nth_order_threshold();
        let mut inner = self.store.lock().await;
        let code = inner.generate_coupon_if_eligible(threshold, self.generator.as_ref());
        let processed = inner.metrics.total_orders_processed;
        drop(inner);

        match &code {
            Some(code) => {
                self.event_sender
                    .send_or_log(Event::CouponGenerated { code: code.clone() })
                    .await;
                info!("Generated new active coupon: {}", code);
            }
            None => debug!(
                "Coupon generation condition not met (orders: {}, n: {})",
                processed, threshold
            ),
        }
        code
    }

    /// Admin-triggered generation with an explicit "not eligible" signal:
    /// errors name the failed condition instead of degrading to `None`.
    #[instrument(skip(self))]
    pub async fn force_generate(&self) -> Result<String, ServiceError> {
        let threshold = self.store.nth_order_threshold();
        let mut inner = self.store.lock().await;
        let processed = inner.metrics.total_orders_processed;

        if processed == 0 {
            return Err(ServiceError::InvalidOperation(
                "No orders have been processed yet to trigger coupon generation".to_string(),
            ));
        }
        if processed % u64::from(threshold) != 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Condition not met: current order count ({}) is not a multiple of {}",
                processed, threshold
            )));
        }

        let code = inner
            .generate_coupon_if_eligible(threshold, self.generator.as_ref())
            .ok_or_else(|| {
                ServiceError::InternalError("Coupon generator produced no code".to_string())
            })?;
        drop(inner);

        self.event_sender
            .send_or_log(Event::CouponGenerated { code: code.clone() })
            .await;
        info!("Admin-generated new active coupon: {}", code);
        Ok(code)
    }

    /// One-time validation and consumption. Returns false (state untouched)
    /// for wrong, missing, already consumed or empty codes. A successful
    /// consumption is irreversible even if the surrounding checkout later
    /// fails.
    #[instrument(skip(self))]
    pub async fn validate_and_consume(&self, code: &str) -> bool {
        let mut inner = self.store.lock().await;
        let consumed = inner.validate_and_consume_coupon(code);
        drop(inner);

        if consumed {
            self.event_sender
                .send_or_log(Event::CouponConsumed {
                    code: code.to_string(),
                })
                .await;
            info!("Coupon {} successfully used and invalidated", code);
        } else {
            debug!("Coupon validation failed for code: {}", code);
        }
        consumed
    }

    /// Read-only projection of the current coupon slot.
    pub async fn status(&self) -> CouponState {
        self.store.lock().await.coupon.clone()
    }
}
