//! HTTP API for the machine registry

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::RegistryApiState;
pub use routes::{create_api_state, create_router};
