use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use super::common::{map_service_error, success_response};
use crate::errors::ApiError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_stats))
        .route("/consumption", get(consumption_usage))
        .route("/consumption/:id/dismiss", post(dismiss_alert))
}

async fn dashboard_stats(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stats = state
        .services
        .reports
        .dashboard_stats()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(stats))
}

#[derive(Debug, Default, Deserialize)]
struct UsageParams {
    #[serde(default)]
    flagged_only: bool,
}

async fn consumption_usage(
    State(state): State<AppState>,
    Query(params): Query<UsageParams>,
) -> Result<Response, ApiError> {
    let records = state
        .services
        .consumption
        .list_usage(params.flagged_only)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(records))
}

async fn dismiss_alert(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let updated = state
        .services
        .consumption
        .dismiss_alert(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(updated))
}
