//! Configuration Loader
//!
//! Layered configuration loading: built-in defaults, an optional file, then
//! `VERTICLE__`-prefixed environment variables (`VERTICLE__WORKER_POOL__MAX_BLOCKING_CREATIONS=4`).

use super::error::{ConfigResult, ConfigurationError};
use super::ResolverConfig;
use crate::constants::env_vars;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loaded, validated configuration plus the context it was loaded in
#[derive(Debug)]
pub struct ConfigManager {
    config: ResolverConfig,
    environment: String,
    source_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load(path: Option<&str>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_with_env(path.map(PathBuf::from), &environment, true)
    }

    /// Load from an explicit file that must exist, ignoring process environment overrides
    ///
    /// Useful for tests that must not depend on global environment variables.
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Arc<ConfigManager>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigurationError::file_not_found(path));
        }
        Self::load_with_env(Some(path.to_path_buf()), "test", false)
    }

    /// Wrap an in-memory configuration after validating it
    pub fn from_config(config: ResolverConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: Self::detect_environment(),
            source_file: None,
        }))
    }

    fn load_with_env(
        path: Option<PathBuf>,
        environment: &str,
        with_env_overrides: bool,
    ) -> ConfigResult<Arc<ConfigManager>> {
        debug!(
            environment = environment,
            file = ?path,
            "Loading resolver configuration"
        );

        let defaults = config::Config::try_from(&ResolverConfig::default())
            .map_err(|e| ConfigurationError::load_error("defaults", e))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = &path {
            builder = builder.add_source(config::File::from(path.as_path()).required(false));
        }

        if with_env_overrides {
            builder = builder.add_source(
                config::Environment::with_prefix(env_vars::CONFIG_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let source_name = path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        let config: ResolverConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigurationError::load_error(source_name, e))?;

        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            source_file: path,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    /// Configuration as JSON for diagnostics
    pub fn debug_config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    /// Detect current environment: VERTICLE_ENV || APP_ENV || 'development'
    pub(crate) fn detect_environment() -> String {
        env::var(env_vars::ENVIRONMENT)
            .or_else(|_| env::var(env_vars::APP_ENVIRONMENT))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_toml_file() {
        let file = write_config(
            r#"
default_scheme = "clj"

[worker_pool]
max_blocking_creations = 2

[registry]
allow_overlapping_schemes = true

[logging]
format = "json"

[[normalization.rules]]
pattern = "_"
replacement = "-"

[[normalization.rules]]
pattern = "$"
replacement = "."
"#,
        );

        let manager = ConfigManager::load_from_file(file.path()).unwrap();
        let config = manager.config();

        assert_eq!(config.default_scheme.as_deref(), Some("clj"));
        assert_eq!(config.worker_pool.max_blocking_creations, 2);
        assert!(config.registry.allow_overlapping_schemes);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.normalization.rules.len(), 2);
        assert_eq!(manager.source_file(), Some(file.path()));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[worker_pool]\nmax_blocking_creations = 3\n");

        let manager = ConfigManager::load_from_file(file.path()).unwrap();
        assert_eq!(manager.config().worker_pool.max_blocking_creations, 3);
        assert_eq!(
            manager.config().normalization,
            ResolverConfig::default().normalization
        );
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let file = write_config("[worker_pool]\nmax_blocking_creations = 0\n");

        let err = ConfigManager::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = ConfigManager::load_from_file("/nonexistent/verticle.toml").unwrap_err();
        assert!(matches!(err, ConfigurationError::FileNotFound { .. }));
    }

    #[test]
    fn test_debug_config_serializes() {
        let manager = ConfigManager::from_config(ResolverConfig::default()).unwrap();
        let json = manager.debug_config();
        assert_eq!(json["worker_pool"]["max_blocking_creations"], 16);
    }
}
