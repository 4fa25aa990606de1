//! # Structured Logging Module
//!
//! Environment-aware structured logging for registry changes and deployment
//! resolutions. Console output is human readable by default and switches to
//! JSON when configured (or when `VERTICLE_LOG_FORMAT=json`).

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigManager, LogFormat, LoggingConfig};
use crate::constants::{env_vars, operations};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging using environment defaults
pub fn init_structured_logging() {
    init_structured_logging_with(&LoggingConfig::default());
}

/// Initialize structured logging with explicit settings
///
/// Only the first call has any effect. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_structured_logging_with(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let level = config
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment).to_string());
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
        let format = get_log_format(config.format);

        let layer = match format {
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
        };

        // A host may already own the global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        }

        tracing::info!(
            environment = %environment,
            level = %level,
            format = ?format,
            "Structured logging initialized"
        );
    });
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" => "warn",
        _ => "debug",
    }
}

fn get_log_format(configured: LogFormat) -> LogFormat {
    match std::env::var(env_vars::LOG_FORMAT).as_deref() {
        Ok("json") => LogFormat::Json,
        Ok("pretty") => LogFormat::Pretty,
        _ => configured,
    }
}

/// Log structured data for registry operations
pub fn log_registry_operation(operation: &str, scheme: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        scheme = %scheme,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REGISTRY_OPERATION"
    );
}

/// Log structured data for a finished resolution
pub fn log_resolution(
    identifier: &str,
    scheme: Option<&str>,
    name: Option<&str>,
    blocking: Option<bool>,
    status: &str,
    duration_ms: u64,
) {
    tracing::info!(
        operation = operations::RESOLVE,
        identifier = %identifier,
        scheme = scheme,
        name = name,
        blocking = blocking,
        status = %status,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "RESOLUTION"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "warn");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_environment_is_case_insensitive() {
        std::env::set_var(env_vars::ENVIRONMENT, "Production");
        let environment = ConfigManager::detect_environment();
        std::env::remove_var(env_vars::ENVIRONMENT);

        assert_eq!(environment, "production");
        assert_eq!(get_log_level(&environment), "info");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging_with(&LoggingConfig {
            format: LogFormat::Json,
            level: Some("trace".to_string()),
        });
        assert!(LOGGER_INITIALIZED.get().is_some());
    }
}
