use axum::{extract::State, routing::get, Router};

use crate::{
    errors::ApiError,
    handlers::common::{map_service_error, success_response, Path},
    AppState,
};

/// Creates the router for product endpoints.
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
}

/// List the catalog.
async fn list_products(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    Ok(success_response(state.services.products.list_products()))
}

/// Get a single product.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get_product(&id)
        .map_err(map_service_error)?;

    Ok(success_response(product))
}
