//! HTTP server infrastructure for GlobalD
//!
//! Wraps an Axum router in an [`HttpServer`] with a consistent lifecycle
//! and graceful shutdown.
//!
//! # Architecture
//!
//! Servers implement the [`Server`] trait. The [`ServerExt`] trait adds
//! `spawn()` and `run_with_ctrl_c()` on top of it.
//!
//! Shutdown coordination uses `CancellationToken` from `tokio_util`; a
//! termination signal cancels the token the running server was given.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, ServerExt};
//!
//! let config = ServerConfig::new("0.0.0.0", 8000);
//! HttpServer::new(config, router).run_with_ctrl_c().await?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod shutdown;
pub mod traits;

pub use config::{ServerConfig, DEFAULT_HTTP_PORT};
pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use traits::{Server, ServerExt};
