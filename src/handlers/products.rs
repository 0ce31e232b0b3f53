use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::get,
    Router,
};

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::errors::ApiError;
use crate::services::products::{NewProduct, ProductPatch};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(low_stock))
        .route("/code/:code", get(get_product_by_code))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state
        .services
        .products
        .list()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let product = state
        .services
        .products
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Lookup by scanned code: internal SKU or supplier barcode.
async fn get_product_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let product = state
        .services
        .products
        .get_by_code(&code)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(product))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPatch>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .products
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

async fn low_stock(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state
        .services
        .products
        .low_stock()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}
