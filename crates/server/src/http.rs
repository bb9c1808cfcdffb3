//! HTTP server implementation using Axum

use async_trait::async_trait;
use axum::Router;
use parking_lot::RwLock;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::traits::Server;

/// Serves an Axum router until its shutdown token is cancelled.
///
/// After cancellation, open connections get `shutdown_grace` to finish
/// before the server stops waiting for them.
#[derive(Clone)]
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
    running: Arc<AtomicBool>,
    bound_addr: Arc<RwLock<Option<SocketAddr>>>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router,
            running: Arc::new(AtomicBool::new(false)),
            bound_addr: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.http_addr()?;
        TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::bind(addr.to_string(), self.config.http_port, e))
    }
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        "http"
    }

    fn address(&self) -> Option<SocketAddr> {
        *self.bound_addr.read()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self, shutdown_token: CancellationToken) -> Result<()> {
        let listener = self.bind().await?;
        let local_addr = listener.local_addr()?;

        *self.bound_addr.write() = Some(local_addr);
        self.running.store(true, Ordering::SeqCst);
        info!(%local_addr, "HTTP server listening");

        let signal = shutdown_token.clone();
        let serve = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                signal.cancelled().await;
                info!("HTTP server received shutdown signal");
            })
            .into_future();
        tokio::pin!(serve);

        let grace = self.config.shutdown_grace;
        let result = tokio::select! {
            result = &mut serve => result,
            _ = async {
                shutdown_token.cancelled().await;
                tokio::time::sleep(grace).await;
            } => {
                warn!(?grace, "Connections still open after grace period, closing");
                Ok(())
            }
        };

        self.running.store(false, Ordering::SeqCst);
        *self.bound_addr.write() = None;

        match result {
            Ok(()) => {
                info!("HTTP server shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!(%e, "HTTP server error");
                Err(ServerError::Io(e))
            }
        }
    }
}
