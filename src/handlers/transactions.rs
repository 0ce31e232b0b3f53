use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};

use super::common::{map_service_error, success_response};
use crate::errors::ApiError;
use crate::services::reports::TransactionFilter;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/:id", get(get_transaction))
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, ApiError> {
    let records = state
        .services
        .reports
        .list_transactions(filter)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(records))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let record = state
        .services
        .reports
        .get_transaction(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(record))
}
