use axum::{
    extract::State,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, no_content_response, success_response, Json, Path,
    },
    services::carts::{AddItemInput, CreateCartInput},
    AppState,
};

/// Creates the router for cart endpoints.
pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/{id}", get(get_cart))
        .route("/{id}/items", post(add_to_cart))
        .route("/{id}/items/{product_id}", delete(remove_cart_item))
}

/// Create a cart, or return the existing one when a known id is supplied.
async fn create_cart(
    State(state): State<AppState>,
    Json(payload): Json<CreateCartRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .create_cart(CreateCartInput {
            cart_id: payload.cart_id,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(cart))
}

/// Get a cart snapshot.
async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .get_cart(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Add an item to a cart.
///
/// Precondition checks happen in the service, in cart, product, quantity
/// order, so an unknown cart answers 404 even when the quantity is also bad.
async fn add_to_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .add_item(
            cart_id,
            AddItemInput {
                product_id: payload.product_id,
                quantity: payload.quantity,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Remove an item from a cart.
async fn remove_cart_item(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(Uuid, String)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .carts
        .remove_item(cart_id, &product_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

// Request DTOs

#[derive(Debug, Default, Deserialize)]
pub struct CreateCartRequest {
    pub cart_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i32,
}
