//! API handlers for registry HTTP endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use observability::ApiMetrics;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use crate::api::models::*;
use crate::error::{RegistryError, Result};
use crate::manager::MachineManager;
use crate::types::{MachineDetail, MachineInput, MachineSummary};

pub struct RegistryApiState {
    pub manager: Arc<MachineManager>,
    pub metrics: ApiMetrics,
    pub service_name: String,
    pub version: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn status_for(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::Validation(_) | RegistryError::Duplicate(_) => StatusCode::BAD_REQUEST,
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: RegistryError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(%err, "Request failed");
    }
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }),
    )
}

/// Record metrics for a finished operation and map its error
fn finish<T>(
    state: &RegistryApiState,
    operation: &'static str,
    started: Instant,
    ok_status: StatusCode,
    result: Result<T>,
) -> std::result::Result<T, ApiError> {
    let result = result.map_err(error_response);
    let status = match &result {
        Ok(_) => ok_status,
        Err((status, _)) => *status,
    };
    state
        .metrics
        .record_request(operation, started.elapsed(), status.as_u16());
    result
}

/// Turn an undecodable request body into a validation error
fn decode_body(body: std::result::Result<Json<MachineInput>, JsonRejection>) -> Result<MachineInput> {
    body.map(|Json(input)| input)
        .map_err(|rejection| RegistryError::validation(rejection.body_text()))
}

/// Service metadata handler
pub async fn root_handler(
    State(state): State<Arc<RegistryApiState>>,
) -> std::result::Result<Json<RootResponse>, ApiError> {
    let machines = state
        .manager
        .machine_count()
        .await
        .map_err(error_response)?;
    state.metrics.set_machine_count(machines);

    let endpoints: BTreeMap<String, String> = [
        ("search", "GET /api/search?q=<query>"),
        ("get_machine", "GET /api/machines/{id}"),
        ("create_machine", "POST /api/machines"),
        ("update_machine", "PUT /api/machines/{id}"),
        ("health", "GET /health"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Ok(Json(RootResponse {
        message: format!("{} API", state.service_name),
        version: state.version.clone(),
        machines,
        endpoints,
    }))
}

/// Health check handler
pub async fn health_handler(State(state): State<Arc<RegistryApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
    })
}

/// Free-text search handler
pub async fn search_machines(
    State(state): State<Arc<RegistryApiState>>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<Vec<MachineSummary>>, ApiError> {
    let started = Instant::now();
    let query = params.q.unwrap_or_default();
    let result = state.manager.search(&query).await;
    finish(&state, "search", started, StatusCode::OK, result).map(Json)
}

/// Get machine handler
pub async fn get_machine(
    State(state): State<Arc<RegistryApiState>>,
    Path(id): Path<i64>,
) -> std::result::Result<Json<MachineDetail>, ApiError> {
    let started = Instant::now();
    let result = state.manager.get_machine(id).await;
    finish(&state, "get_machine", started, StatusCode::OK, result).map(Json)
}

/// Create machine handler
pub async fn create_machine(
    State(state): State<Arc<RegistryApiState>>,
    body: std::result::Result<Json<MachineInput>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<CreateMachineResponse>), ApiError> {
    let started = Instant::now();
    let result = match decode_body(body) {
        Ok(input) => state.manager.create_machine(input).await,
        Err(e) => Err(e),
    };
    let id = finish(&state, "create_machine", started, StatusCode::CREATED, result)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateMachineResponse { success: true, id }),
    ))
}

/// Update machine handler
pub async fn update_machine(
    State(state): State<Arc<RegistryApiState>>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<MachineInput>, JsonRejection>,
) -> std::result::Result<Json<MachineDetail>, ApiError> {
    let started = Instant::now();
    let result = match decode_body(body) {
        Ok(input) => state.manager.update_machine(id, input).await,
        Err(e) => Err(e),
    };
    finish(&state, "update_machine", started, StatusCode::OK, result).map(Json)
}
