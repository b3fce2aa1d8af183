//! Configuration validation.
//!
//! Returns all validation errors, not just the first. Serde handles the
//! syntactic side; these are the semantic checks run before a config is
//! accepted.

use std::fmt;
use crate::config::schema::ProxyConfig;

/// A single semantic problem with a loaded configuration.
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

impl std::error::Error for ValidationError {}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let default_url = config.upstream.default_url.trim();
    if default_url.is_empty() {
        errors.push(ValidationError::new("upstream.default_url", "must not be empty"));
    } else {
        // The control endpoint accepts any string, so a suspicious default is
        // only worth a warning.
        match url::Url::parse(default_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => tracing::warn!(
                url = %default_url,
                scheme = %parsed.scheme(),
                "Default upstream URL does not use http or https"
            ),
            Err(e) => tracing::warn!(
                url = %default_url,
                error = %e,
                "Default upstream URL does not parse as a URL"
            ),
        }
    }

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }
    if config.timeouts.forward_secs == 0 {
        errors.push(ValidationError::new("timeouts.forward_secs", "must be greater than zero"));
    }
    if config.timeouts.health_secs == 0 {
        errors.push(ValidationError::new("timeouts.health_secs", "must be greater than zero"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::new("limits.max_body_size", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
