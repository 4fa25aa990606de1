//! # Resolver Configuration
//!
//! Configuration for the deployment resolver: normalization rules, registry
//! policy, blocking pool sizing, loader search roots and logging.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use verticle_resolver::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Defaults, then verticle.toml if present, then VERTICLE__* overrides
//! let manager = ConfigManager::load(Some("verticle.toml"))?;
//!
//! let pool_size = manager.config().worker_pool.max_blocking_creations;
//! let default_scheme = manager.config().default_scheme.clone();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::defaults;
use crate::identifier::scheme_syntax_error;
use crate::normalizer::NameNormalizer;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Scheme applied to bare identifiers (`<name>` with no scheme marker)
    pub default_scheme: Option<String>,

    /// Ordered rewrite rules applied to bare names
    pub normalization: NormalizationConfig,

    /// Factory registry policy
    pub registry: RegistryConfig,

    /// Bounded pool for blocking factory creations
    pub worker_pool: WorkerPoolConfig,

    /// Default loader context handed to factories
    pub loader: LoaderConfig,

    /// Structured logging settings
    pub logging: LoggingConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_scheme: None,
            normalization: NormalizationConfig::default(),
            registry: RegistryConfig::default(),
            worker_pool: WorkerPoolConfig::default(),
            loader: LoaderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Single `pattern -> replacement` rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleConfig {
    pub pattern: String,
    pub replacement: String,
}

impl RuleConfig {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub rules: Vec<RuleConfig>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        // snake_case file names map to kebab-case namespaces
        Self {
            rules: vec![RuleConfig::new("_", "-")],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Permit schemes that are prefixes of one another
    pub allow_overlapping_schemes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Maximum number of blocking creations running at once
    pub max_blocking_creations: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_blocking_creations: defaults::MAX_BLOCKING_CREATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directories searched, in order, by file-backed factories
    pub search_roots: Vec<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            search_roots: vec![PathBuf::from(".")],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive; falls back to the environment's default level
    pub level: Option<String>,
}

impl ResolverConfig {
    /// Validate values that serde alone cannot check
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_pool.max_blocking_creations == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker_pool.max_blocking_creations",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if let Some(scheme) = &self.default_scheme {
            if let Some(reason) = scheme_syntax_error(scheme) {
                return Err(ConfigurationError::invalid_value(
                    "default_scheme",
                    scheme.as_str(),
                    reason,
                ));
            }
        }

        if self.loader.search_roots.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "loader.search_roots",
                "loader configuration",
            ));
        }

        NameNormalizer::from_config(&self.normalization)?;

        Ok(())
    }
}
