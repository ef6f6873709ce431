use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ApiError,
    handlers::common::{created_response, map_service_error, Json},
    services::checkout::CheckoutInput,
    AppState,
};

/// Creates the router for the checkout endpoint.
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

/// Convert a cart into an order, applying at most one coupon discount.
///
/// An invalid coupon does not fail the request; the order simply carries no
/// discount.
async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .checkout
        .checkout(CheckoutInput {
            cart_id: payload.cart_id,
            coupon_code: payload.coupon_code,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub cart_id: Uuid,
    pub coupon_code: Option<String>,
}
