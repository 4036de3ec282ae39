//! Configuration loading from disk and the process environment.
//!
//! # Environment Keys
//! | Key | Effect |
//! |---|---|
//! | `APP_ENV` (or `RUST_ENV`) | `development` / `production` / `test` |
//! | `LOG_LEVEL` | minimum level override |
//! | `LOG_PRETTY` | force human-readable output |
//! | `SERVICE_NAME`, `SERVICE_VERSION`, `HOSTNAME` | base record fields |
//! | `BIND_ADDRESS`, `HEALTH_PATH` | server settings |

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    Env { key: String, message: String },

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

/// Load, overlay the process environment, and validate.
///
/// Without a path the defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let base = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    let config = apply_env(base, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment-style key/value pairs onto `config`.
///
/// Unknown keys are ignored. `APP_ENV` takes precedence over `RUST_ENV`.
pub fn apply_env<I, K, V>(mut config: AppConfig, vars: I) -> Result<AppConfig, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut app_env = None;
    let mut rust_env = None;

    for (key, value) in vars {
        let value: String = value.into();
        match key.as_ref() {
            "APP_ENV" => app_env = Some(value),
            "RUST_ENV" => rust_env = Some(value),
            "LOG_LEVEL" => {
                config.logging.log_level = Some(value).filter(|v| !v.trim().is_empty());
            }
            "LOG_PRETTY" => config.logging.log_pretty = parse_flag("LOG_PRETTY", &value)?,
            "SERVICE_NAME" => config.logging.service_name = value,
            "SERVICE_VERSION" => config.logging.service_version = value,
            "HOSTNAME" => config.logging.hostname = value,
            "BIND_ADDRESS" => config.server.bind_address = value,
            "HEALTH_PATH" => config.server.health_path = value,
            _ => {}
        }
    }

    if let Some((key, value)) = app_env
        .map(|v| ("APP_ENV", v))
        .or_else(|| rust_env.map(|v| ("RUST_ENV", v)))
    {
        config.logging.environment = value
            .parse::<Environment>()
            .map_err(|message| ConfigError::Env {
                key: key.to_string(),
                message,
            })?;
    }

    Ok(config)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Env {
            key: key.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overlay() {
        let config = apply_env(
            AppConfig::default(),
            [
                ("APP_ENV", "production"),
                ("LOG_LEVEL", "debug"),
                ("LOG_PRETTY", "true"),
                ("SERVICE_NAME", "accounts"),
                ("HEALTH_PATH", "/healthz"),
                ("UNRELATED", "x"),
            ],
        )
        .unwrap();

        assert_eq!(config.logging.environment, Environment::Production);
        assert_eq!(config.logging.log_level.as_deref(), Some("debug"));
        assert!(config.logging.log_pretty);
        assert_eq!(config.logging.service_name, "accounts");
        assert_eq!(config.server.health_path, "/healthz");
    }

    #[test]
    fn test_app_env_wins_over_rust_env() {
        let config = apply_env(
            AppConfig::default(),
            [("RUST_ENV", "test"), ("APP_ENV", "production")],
        )
        .unwrap();
        assert_eq!(config.logging.environment, Environment::Production);

        let config = apply_env(AppConfig::default(), [("RUST_ENV", "test")]).unwrap();
        assert_eq!(config.logging.environment, Environment::Test);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            apply_env(AppConfig::default(), [("LOG_PRETTY", "maybe")]),
            Err(ConfigError::Env { .. })
        ));
        assert!(matches!(
            apply_env(AppConfig::default(), [("APP_ENV", "staging")]),
            Err(ConfigError::Env { .. })
        ));
    }

    #[test]
    fn test_empty_log_level_is_unset() {
        let config = apply_env(AppConfig::default(), [("LOG_LEVEL", " ")]).unwrap();
        assert!(config.logging.log_level.is_none());
    }
}
