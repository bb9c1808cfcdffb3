use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Load a configuration file, substituting environment variables first.
#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GlobaldConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());
    parse_config(&content)
}

/// Parse configuration from YAML text, substituting environment variables first.
pub fn parse_config(content: &str) -> Result<GlobaldConfig> {
    let substituted = substitution::substitute_env_vars(content)?;

    let config: GlobaldConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!(service = %config.service.name, "Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> GlobaldConfig {
    GlobaldConfig {
        service: ServiceConfig {
            name: default_service_name(),
            version: default_service_version(),
        },
        server: HttpConfig::default(),
        database: DatabaseConfig::default(),
        observability: ObservabilityConfig::default(),
    }
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &GlobaldConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_applies_defaults() {
        let config = parse_config("service:\n  name: GlobalD\n  version: 1.0.0\n").unwrap();

        assert_eq!(config.server.http_port, 8000);
        assert_eq!(config.database.url, "sqlite://globald.db");
        assert!(!config.database.seed_sample_data);
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.observability.metrics_port, None);
    }

    #[test]
    fn test_parse_full() {
        let yaml = r#"
service:
  name: GlobalD
  version: 2.1.0
server:
  host: 127.0.0.1
  http_port: 9000
database:
  url: "sqlite::memory:"
  max_connections: 1
  seed_sample_data: true
observability:
  log_format: json
  log_level: debug
  metrics_port: 9100
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.http_port, 9000);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert!(config.database.seed_sample_data);
        assert_eq!(config.observability.metrics_port, Some(9100));
    }

    #[test]
    fn test_parse_rejects_missing_service() {
        assert!(parse_config("server:\n  http_port: 8000\n").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("globald.yaml");

        let config = generate_default_config();
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded.service.name, config.service.name);
        assert_eq!(loaded.server.http_port, config.server.http_port);
        assert_eq!(loaded.database.url, config.database.url);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
