//! Configuration validation.
//!
//! Serde handles syntax; this pass checks values that would only fail later,
//! at connect time. All problems are reported at once.

use std::fmt;

use crate::config::schema::ServiceConfig;

/// One semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a config, returning every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let db = &config.database;
    let mut errors = Vec::new();

    if db.host.trim().is_empty() {
        errors.push(ValidationError::new("database.host", "must not be empty"));
    }
    if db.database.trim().is_empty() {
        errors.push(ValidationError::new("database.database", "must not be empty"));
    }
    if db.user.trim().is_empty() {
        errors.push(ValidationError::new("database.user", "must not be empty"));
    }
    if db.port == 0 {
        errors.push(ValidationError::new("database.port", "must be non-zero"));
    }
    if db.pool_size == 0 {
        errors.push(ValidationError::new("database.pool_size", "must be at least 1"));
    }
    if db.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "database.connect_timeout_secs",
            "must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
