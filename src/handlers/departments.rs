use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::get,
    Router,
};

use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::errors::ApiError;
use crate::services::departments::NewDepartment;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route("/:id", get(get_department))
}

async fn list_departments(State(state): State<AppState>) -> Result<Response, ApiError> {
    let departments = state
        .services
        .departments
        .list()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(departments))
}

async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let department = state
        .services
        .departments
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(department))
}

async fn create_department(
    State(state): State<AppState>,
    Json(payload): Json<NewDepartment>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let department = state
        .services
        .departments
        .create(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(department))
}
