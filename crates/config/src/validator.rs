use crate::*;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Service name is required")]
    MissingServiceName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("{field} must be a non-zero port")]
    InvalidPort { field: String },

    #[error("metrics_port {0} conflicts with http_port")]
    PortConflict(u16),

    #[error("Unsupported database URL '{0}'. Only sqlite URLs are supported")]
    UnsupportedDatabase(String),

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Environment variable in '{field}' is not set: {value}")]
    InvalidEnvVar { field: String, value: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version pattern is valid"))
}

pub fn validate_config(config: &GlobaldConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_service(&config.service, &mut report);
    validate_server(config, &mut report);
    validate_database(&config.database, &mut report);
    validate_observability(&config.observability, &mut report);

    report
}

fn validate_service(service: &ServiceConfig, report: &mut ValidationReport) {
    if service.name.trim().is_empty() {
        report.add_error(ValidationError::MissingServiceName);
    }
    if !version_re().is_match(&service.version) {
        report.add_error(ValidationError::InvalidVersionFormat(service.version.clone()));
    }
}

fn validate_server(config: &GlobaldConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.http_port == 0 {
        report.add_error(ValidationError::InvalidPort {
            field: "server.http_port".to_string(),
        });
    }
    if server.host.trim().is_empty() {
        report.add_warning("server.host", "empty host, binding will fail");
    }

    match config.observability.metrics_port {
        Some(0) => report.add_error(ValidationError::InvalidPort {
            field: "observability.metrics_port".to_string(),
        }),
        Some(port) if port == server.http_port => {
            report.add_error(ValidationError::PortConflict(port))
        }
        _ => {}
    }
}

fn validate_database(database: &DatabaseConfig, report: &mut ValidationReport) {
    if has_unresolved_env_vars(&database.url) {
        report.add_error(ValidationError::InvalidEnvVar {
            field: "database.url".to_string(),
            value: database.url.clone(),
        });
    } else if !database.url.starts_with("sqlite:") {
        report.add_error(ValidationError::UnsupportedDatabase(database.url.clone()));
    } else if database.url.contains(":memory:") {
        report.add_warning(
            "database.url",
            "in-memory database, all data is lost when the process exits",
        );
    }

    if database.max_connections == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "database.max_connections".to_string(),
        });
    }

    if database.seed_sample_data {
        report.add_warning(
            "database.seed_sample_data",
            "sample machines will be inserted if the database is empty",
        );
    }
}

fn validate_observability(observability: &ObservabilityConfig, report: &mut ValidationReport) {
    let format = observability.log_format.trim().to_lowercase();
    if !SUPPORTED_LOG_FORMATS.contains(&format.as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(
            observability.log_format.clone(),
        ));
    }

    if observability.metrics_port.is_none() {
        report.add_default("observability.metrics_port", "disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_config(&generate_default_config());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.defaults_applied.len(), 1);
    }

    #[test]
    fn test_invalid_fields() {
        let mut config = generate_default_config();
        config.service.name = " ".to_string();
        config.service.version = "1.0".to_string();
        config.server.http_port = 0;
        config.database.max_connections = 0;
        config.observability.log_format = "xml".to_string();

        let report = validate_config(&config);
        assert!(!report.is_valid());
        assert!(report.errors.contains(&ValidationError::MissingServiceName));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidVersionFormat("1.0".to_string())));
        assert!(report.errors.contains(&ValidationError::InvalidPort {
            field: "server.http_port".to_string()
        }));
        assert!(report.errors.contains(&ValidationError::InvalidPositiveInteger {
            field: "database.max_connections".to_string()
        }));
        assert!(report
            .errors
            .contains(&ValidationError::InvalidLogFormat("xml".to_string())));
    }

    #[test]
    fn test_database_url_rules() {
        let mut config = generate_default_config();

        config.database.url = "postgres://localhost/globald".to_string();
        assert!(validate_config(&config)
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnsupportedDatabase(_))));

        config.database.url = "${GLOBALD_DB_NEVER_SET}".to_string();
        assert!(validate_config(&config)
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidEnvVar { .. })));

        config.database.url = "sqlite::memory:".to_string();
        let report = validate_config(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.field == "database.url"));
    }

    #[test]
    fn test_metrics_port_conflict() {
        let mut config = generate_default_config();
        config.observability.metrics_port = Some(config.server.http_port);
        let report = validate_config(&config);
        assert!(report
            .errors
            .contains(&ValidationError::PortConflict(config.server.http_port)));
    }
}
