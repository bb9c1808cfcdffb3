//! Registry error types

use thiserror::Error;

/// Errors that can occur in the machine registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Input rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Machine not found
    #[error("Machine not found: {0}")]
    NotFound(i64),

    /// Unique constraint violated (duplicate machine number)
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable error code used in API responses
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Validation(_) => "VALIDATION_ERROR",
            RegistryError::NotFound(_) => "MACHINE_NOT_FOUND",
            RegistryError::Duplicate(_) => "DUPLICATE_MACHINE",
            RegistryError::Storage(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RegistryError::Duplicate(db.message().to_string())
            }
            other => RegistryError::Storage(other.to_string()),
        }
    }
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
