//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Default upstream URL.
pub const ENV_UPSTREAM_URL: &str = "CLOUDFLARED_TUNNEL_URL";
/// Listen port.
pub const ENV_PORT: &str = "PORT";
/// Environment label echoed by `/status`.
pub const ENV_LABEL: &str = "FLASK_ENV";
/// `proxy` or `redirect`.
pub const ENV_MODE: &str = "PROXY_MODE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// Defaults are overlaid by the optional TOML file, which is in turn
/// overlaid by the process environment.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    let config = apply_env(config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config` using `lookup` to read them.
pub fn apply_env<F>(mut config: ProxyConfig, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_UPSTREAM_URL) {
        config.upstream.default_url = url;
    }

    if let Some(port) = lookup(ENV_PORT) {
        config.listener.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Env {
                var: ENV_PORT,
                value: port.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    if let Some(label) = lookup(ENV_LABEL) {
        config.environment = label;
    }

    if let Some(mode) = lookup(ENV_MODE) {
        config.mode = mode.parse().map_err(|reason| ConfigError::Env {
            var: ENV_MODE,
            value: mode.clone(),
            reason,
        })?;
    }

    Ok(config)
}
