//! API routes for the machine registry

use axum::{
    routing::{get, post},
    Router,
};
use observability::ApiMetrics;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::*;
use crate::manager::MachineManager;

/// Create the registry router
pub fn create_router(state: RegistryApiState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/search", get(search_machines))
        .route("/api/machines", post(create_machine))
        .route("/api/machines/:id", get(get_machine).put(update_machine))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Get the API state for the router
pub fn create_api_state(
    manager: MachineManager,
    service_name: impl Into<String>,
    version: impl Into<String>,
) -> RegistryApiState {
    let service_name = service_name.into();
    RegistryApiState {
        manager: Arc::new(manager),
        metrics: ApiMetrics::new(&service_name),
        service_name,
        version: version.into(),
    }
}
