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
use crate::services::purchase_requests::{NewPurchaseRequest, RequestPatch};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/pending-items/:code", get(pending_items_by_code))
        .route(
            "/:id",
            get(get_request).put(update_request).delete(delete_request),
        )
        .route("/:id/items", get(request_items))
}

async fn list_requests(State(state): State<AppState>) -> Result<Response, ApiError> {
    let requests = state
        .services
        .purchase_requests
        .list()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(requests))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let request = state
        .services
        .purchase_requests
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(request))
}

async fn request_items(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let items = state
        .services
        .purchase_requests
        .items_for_request(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

/// Open request lines awaiting delivery of a scanned product code.
async fn pending_items_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let items = state
        .services
        .purchase_requests
        .pending_items_by_code(&code)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<NewPurchaseRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .purchase_requests
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(created))
}

async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RequestPatch>,
) -> Result<Response, ApiError> {
    let updated = state
        .services
        .purchase_requests
        .update(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(updated))
}

async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    state
        .services
        .purchase_requests
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
