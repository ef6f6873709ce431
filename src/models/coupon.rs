use serde::{Deserialize, Serialize};

/// The single active coupon slot.
///
/// Invariant: `active_code` is `Some` exactly while a generated code has been
/// neither consumed nor overwritten by a newer generation. Only the coupon
/// issuer mutates this state: generation sets both fields, consumption clears
/// both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouponState {
    pub active_code: Option<String>,
    pub is_available: bool,
}
