use axum::{
    extract::{Json, State},
    response::Response,
    routing::post,
    Router,
};

use super::common::{created_response, map_service_error, validate_input};
use crate::errors::ApiError;
use crate::services::issuance::IssueStockInput;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/issue", post(issue_stock))
}

/// Issues stock to a department. The response carries the OUT ledger entry
/// and, for consumables, an advisory over-consumption warning.
async fn issue_stock(
    State(state): State<AppState>,
    Json(payload): Json<IssueStockInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let outcome = state
        .services
        .issuance
        .issue(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(outcome))
}
