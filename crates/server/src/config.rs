//! Listener configuration for the HTTP server

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Result, ServerError};

/// Port the registry API listens on when nothing else is configured
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// How long in-flight requests get to finish once shutdown starts
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Where and how the HTTP server listens.
///
/// A port of `0` asks the OS for an ephemeral port, which tests rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Loopback config on an ephemeral port
    pub fn local_ephemeral() -> Self {
        Self::new("127.0.0.1", 0)
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Resolve host and port into a socket address
    pub fn http_addr(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.http_port);
        raw.parse().map_err(|_| ServerError::InvalidAddress(raw))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", DEFAULT_HTTP_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.shutdown_grace, DEFAULT_SHUTDOWN_GRACE);
    }

    #[test]
    fn test_http_addr() {
        let addr = ServerConfig::new("127.0.0.1", 9000).http_addr().unwrap();
        assert_eq!(addr.port(), 9000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_invalid_host() {
        let err = ServerConfig::new("not a host", 9000).http_addr().unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress(ref a) if a == "not a host:9000"));
    }

    #[test]
    fn test_shutdown_grace_override() {
        let config = ServerConfig::local_ephemeral().with_shutdown_grace(Duration::from_secs(2));
        assert_eq!(config.http_port, 0);
        assert_eq!(config.shutdown_grace, Duration::from_secs(2));
    }
}
