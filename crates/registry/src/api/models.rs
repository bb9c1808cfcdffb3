//! API models for registry HTTP endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query string of `GET /api/search`
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Response after creating a machine
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMachineResponse {
    pub success: bool,
    pub id: i64,
}

/// Error detail
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Generic error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Service metadata returned by `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub machines: u64,
    pub endpoints: BTreeMap<String, String>,
}
