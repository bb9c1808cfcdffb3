pub fn default_service_name() -> String {
    "GlobalD".to_string()
}

pub fn default_service_version() -> String {
    "1.0.0".to_string()
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    8000
}

pub fn default_database_url() -> String {
    "sqlite://globald.db".to_string()
}

pub fn default_max_connections() -> u32 {
    5
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

/// Log formats understood by the observability crate
pub const SUPPORTED_LOG_FORMATS: &[&str] = &["pretty", "json", "compact"];
