//! Configuration validation rules.
//!
//! Only global settings are validated here. Phase entries are resolved
//! leniently by the registry, which logs and defaults malformed fields.

use crate::config::schema::ForgeConfig;
use crate::error::{OmniforgeError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &ForgeConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let settings = &config.settings;

    if settings.default_timeout == 0 {
        errors.push(ValidationError {
            rule: "zero-timeout".to_string(),
            message: "settings.default_timeout must be greater than zero".to_string(),
        });
    }

    if settings.interpreter.trim().is_empty() {
        errors.push(ValidationError {
            rule: "empty-interpreter".to_string(),
            message: "settings.interpreter must name a program".to_string(),
        });
    }

    if settings.state_file.as_os_str().is_empty() {
        errors.push(ValidationError {
            rule: "empty-state-file".to_string(),
            message: "settings.state_file must not be empty".to_string(),
        });
    }

    errors
}

/// Validate a configuration, failing with all messages joined.
pub fn validate(config: &ForgeConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(OmniforgeError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
