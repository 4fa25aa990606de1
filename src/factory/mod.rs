//! # Verticle Factories
//!
//! The capability a guest-language backend implements to turn a normalized
//! name into an execution unit, plus the contexts handed to it.
//!
//! ## Overview
//!
//! A factory declares the scheme it serves ([`VerticleFactory::prefix`]) and
//! whether creation may block ([`VerticleFactory::blocking_create`]). The
//! registry reads both once at registration; the resolver honors the blocking
//! flag by moving creation onto the bounded blocking pool.
//!
//! ## Available Factories
//!
//! - **ScriptFactory**: namespace-to-file loader for script verticles (blocking)
//! - **FnFactory**: closure-backed factory for hosts and tests
//!
//! ## Usage
//!
//! ```rust
//! use verticle_resolver::factory::{
//!     ExecutionUnit, FnFactory, LoaderContext, SimpleUnit, VerticleFactory,
//! };
//!
//! let factory = FnFactory::new("mem", |name: &str, _loader: &LoaderContext| {
//!     Ok(SimpleUnit::boxed(name))
//! });
//!
//! let unit = factory.create_unit("echo-server", &LoaderContext::default()).unwrap();
//! assert_eq!(unit.name(), "echo-server");
//! ```

pub mod function;
pub mod script;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::LoaderConfig;
use crate::error::FactoryError;

pub use function::{FnFactory, SimpleUnit};
pub use script::{ScriptFactory, ScriptUnit};

/// A deployable unit produced by a factory and run by the host
#[async_trait]
pub trait ExecutionUnit: Send + Sync + fmt::Debug {
    /// Normalized name the unit was created for
    fn name(&self) -> &str;

    /// Called by the host once the unit is deployed
    async fn start(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called by the host when the unit is undeployed
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Owned handle returned to the caller of a resolution
pub type ExecutionUnitHandle = Box<dyn ExecutionUnit>;

/// Capability set of a unit factory
pub trait VerticleFactory: Send + Sync + 'static {
    /// Scheme this factory serves, e.g. `clj`
    fn prefix(&self) -> &str;

    /// Whether `create_unit` may block the calling thread
    fn blocking_create(&self) -> bool {
        false
    }

    /// Called once at registration, before the factory becomes visible
    ///
    /// Runs before the registry's final conflict check. A registration that
    /// then fails with `DuplicateScheme` or `AmbiguousScheme` drops the
    /// factory after `init`, so `init` must not leave state that outlives it.
    fn init(&mut self, _host: &HostContext) {}

    fn create_unit(
        &self,
        name: &str,
        loader: &LoaderContext,
    ) -> Result<ExecutionUnitHandle, FactoryError>;
}

/// Identity of the host runtime a registry belongs to
#[derive(Debug, Clone)]
pub struct HostContext {
    name: String,
    instance_id: Uuid,
    started_at: DateTime<Utc>,
    properties: HashMap<String, String>,
}

impl HostContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance_id: Uuid::new_v4(),
            started_at: Utc::now(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Where and how factories look for units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderContext {
    search_roots: Vec<PathBuf>,
    properties: HashMap<String, String>,
}

impl LoaderContext {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        Self {
            search_roots,
            properties: HashMap::new(),
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.search_roots.clone())
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Search roots in priority order
    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl Default for LoaderContext {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}
