use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{get, post},
    Router,
};

use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::errors::ApiError;
use crate::services::receiving::ReceiveItemInput;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(receive_item))
        .route("/item/:item_id", get(receipts_for_item))
        .route("/item/:item_id/timeline", get(item_timeline))
}

async fn receive_item(
    State(state): State<AppState>,
    Json(payload): Json<ReceiveItemInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let receiving = state
        .services
        .receiving
        .receive_item(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(receiving))
}

async fn receipts_for_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<Response, ApiError> {
    let receipts = state
        .services
        .receiving
        .receipts_for_item(item_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(receipts))
}

async fn item_timeline(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<Response, ApiError> {
    let timeline = state
        .services
        .receiving
        .timeline(item_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(timeline))
}
