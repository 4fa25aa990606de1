//! # Script Factory
//!
//! Loads script verticles by namespace from a set of search roots.
//!
//! Namespaces use kebab-case segments separated by dots while source files
//! use snake_case directories, so `my-app.http-server` is looked up as
//! `my_app/http_server.clj` under each root in turn. Reading the source is
//! blocking I/O, so the factory declares a blocking create path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use super::{ExecutionUnit, ExecutionUnitHandle, HostContext, LoaderContext, VerticleFactory};
use crate::constants::defaults;
use crate::error::FactoryError;

/// Factory for namespace-addressed script sources
#[derive(Debug, Clone)]
pub struct ScriptFactory {
    prefix: String,
    extension: String,
    host: Option<HostContext>,
}

impl ScriptFactory {
    /// Factory for `clj` namespaces stored in `.clj` files
    pub fn new() -> Self {
        Self::with_prefix(defaults::SCRIPT_SCHEME, defaults::SCRIPT_EXTENSION)
    }

    pub fn with_prefix(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
            host: None,
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Host this factory was initialized with, if registered
    pub fn host(&self) -> Option<&HostContext> {
        self.host.as_ref()
    }

    /// Relative source path for a namespace, `None` if the namespace is malformed
    pub fn source_path_for(&self, namespace: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = namespace.split('.').collect();
        let valid = segments.iter().all(|segment| {
            !segment.is_empty()
                && !segment.contains(['/', '\\'])
                && !segment.contains(char::is_whitespace)
        });
        if !valid {
            return None;
        }

        let mut path: PathBuf = segments
            .iter()
            .map(|segment| segment.replace('-', "_"))
            .collect();
        path.set_extension(&self.extension);
        Some(path)
    }

    /// Locate and read the source for `namespace`
    pub fn load(
        &self,
        namespace: &str,
        loader: &LoaderContext,
    ) -> Result<ScriptUnit, FactoryError> {
        let relative = self
            .source_path_for(namespace)
            .ok_or_else(|| FactoryError::unit_not_found(namespace))?;

        for root in loader.search_roots() {
            let candidate = root.join(&relative);
            match fs::read_to_string(&candidate) {
                Ok(source) => {
                    debug!(
                        namespace = namespace,
                        path = %candidate.display(),
                        bytes = source.len(),
                        "Loaded script source"
                    );
                    return Ok(ScriptUnit {
                        namespace: namespace.to_string(),
                        source_path: candidate,
                        source,
                        host_instance: self.host.as_ref().map(HostContext::instance_id),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(FactoryError::load_failure(
                        namespace,
                        anyhow::Error::new(e)
                            .context(format!("reading {}", candidate.display())),
                    ));
                }
            }
        }

        debug!(
            namespace = namespace,
            relative = %relative.display(),
            roots = loader.search_roots().len(),
            "Script source not found in any search root"
        );
        Err(FactoryError::unit_not_found(namespace))
    }
}

impl Default for ScriptFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl VerticleFactory for ScriptFactory {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn blocking_create(&self) -> bool {
        true
    }

    fn init(&mut self, host: &HostContext) {
        self.host = Some(host.clone());
    }

    fn create_unit(
        &self,
        name: &str,
        loader: &LoaderContext,
    ) -> Result<ExecutionUnitHandle, FactoryError> {
        let unit = self.load(name, loader)?;
        Ok(Box::new(unit))
    }
}

/// A loaded script verticle
#[derive(Debug, Clone)]
pub struct ScriptUnit {
    namespace: String,
    source_path: PathBuf,
    source: String,
    host_instance: Option<Uuid>,
}

impl ScriptUnit {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn host_instance(&self) -> Option<Uuid> {
        self.host_instance
    }
}

impl ExecutionUnit for ScriptUnit {
    fn name(&self) -> &str {
        &self.namespace
    }
}
