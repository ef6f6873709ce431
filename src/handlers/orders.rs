use axum::{extract::State, routing::get, Router};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    handlers::common::{map_service_error, success_response, Path},
    AppState,
};

/// Creates the router for order endpoints. Orders are immutable; only reads
/// exist.
pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
}

/// List all orders, oldest first.
async fn list_orders(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    Ok(success_response(
        state.services.checkout.list_orders().await,
    ))
}

/// Get a single order.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .checkout
        .get_order(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}
