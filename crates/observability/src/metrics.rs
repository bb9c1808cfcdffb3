//! Prometheus metrics infrastructure
//!
//! Metrics recorded before [`init_metrics`] is called (or when it never is)
//! go to the no-op recorder.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter on `0.0.0.0:<port>/metrics`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// API metrics for one service
///
/// # Metrics
///
/// * `api_requests_total{service, operation, status}`
/// * `api_request_duration_seconds{service, operation}`
/// * `registry_machines{service}` - last observed machine count
#[derive(Debug, Clone)]
pub struct ApiMetrics {
    service: String,
}

impl ApiMetrics {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    /// Record a completed API operation
    pub fn record_request(&self, operation: &'static str, duration: Duration, status_code: u16) {
        counter!(
            "api_requests_total",
            "service" => self.service.clone(),
            "operation" => operation,
            "status" => status_code.to_string()
        )
        .increment(1);
        histogram!(
            "api_request_duration_seconds",
            "service" => self.service.clone(),
            "operation" => operation
        )
        .record(duration.as_secs_f64());
    }

    pub fn set_machine_count(&self, count: u64) {
        gauge!("registry_machines", "service" => self.service.clone()).set(count as f64);
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}
