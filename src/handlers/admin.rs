use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::{
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response},
    AppState,
};

/// Creates the router for admin endpoints.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/coupons/generate", post(generate_coupon))
        .route("/coupons/status", get(coupon_status))
        .route("/metrics", get(metrics))
}

/// Force coupon generation. Fails with an explicit "not eligible" signal
/// when no order has been processed yet or the order count is not a
/// threshold multiple.
async fn generate_coupon(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let code = state
        .services
        .coupons
        .force_generate()
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "message": "Discount code generated successfully",
        "coupon_code": code,
    })))
}

/// Read-only view of the current coupon slot.
async fn coupon_status(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    Ok(success_response(state.services.coupons.status().await))
}

/// Store metrics plus coupon state and the configured threshold.
async fn metrics(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    Ok(success_response(state.store.metrics_report().await))
}
