//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the bind address and health path shapes
//! - Check the log level override names a known level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::observability::LogLevel;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.bind_address '{0}' is not a host:port address")]
    BindAddress(String),

    #[error("server.health_path '{0}' must start with '/'")]
    HealthPath(String),

    #[error("server.request_timeout_secs must be greater than 0")]
    ZeroTimeout,

    #[error("server.max_body_bytes must be greater than 0")]
    ZeroBodyLimit,

    #[error("logging.log_level '{0}' is not a known level")]
    LogLevel(String),

    #[error("logging.service_name must not be empty")]
    EmptyServiceName,
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let server = &config.server;
    let logging = &config.logging;

    if !is_bind_address(&server.bind_address) {
        errors.push(ValidationError::BindAddress(server.bind_address.clone()));
    }
    if !server.health_path.starts_with('/') {
        errors.push(ValidationError::HealthPath(server.health_path.clone()));
    }
    if server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if server.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if let Some(level) = &logging.log_level {
        if level.parse::<LogLevel>().is_err() {
            errors.push(ValidationError::LogLevel(level.clone()));
        }
    }
    if logging.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `ip:port`, `[v6]:port` or `host:port`; the host is resolved at bind time.
fn is_bind_address(addr: &str) -> bool {
    if addr.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match addr.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.server.bind_address = "nowhere".to_string();
        config.server.health_path = "health".to_string();
        config.server.request_timeout_secs = 0;
        config.logging.log_level = Some("chatty".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("nowhere".to_string()),
                ValidationError::HealthPath("health".to_string()),
                ValidationError::ZeroTimeout,
                ValidationError::LogLevel("chatty".to_string()),
            ]
        );
    }

    #[test]
    fn test_hostname_bind_addresses() {
        let mut config = AppConfig::default();
        config.server.bind_address = "localhost:3000".to_string();
        assert_eq!(validate_config(&config), Ok(()));

        for bad in ["localhost", "localhost:http", ":3000", "::1:3000"] {
            config.server.bind_address = bad.to_string();
            assert_eq!(
                validate_config(&config),
                Err(vec![ValidationError::BindAddress(bad.to_string())])
            );
        }
        config.server.bind_address = "[::1]:3000".to_string();
        assert_eq!(validate_config(&config), Ok(()));
    }
}
