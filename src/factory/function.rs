//! Closure-backed factories.

use std::fmt;

use super::{ExecutionUnit, ExecutionUnitHandle, LoaderContext, VerticleFactory};
use crate::error::FactoryError;

/// Factory delegating unit creation to a closure
pub struct FnFactory<F> {
    prefix: String,
    blocking: bool,
    create: F,
}

impl<F> FnFactory<F>
where
    F: Fn(&str, &LoaderContext) -> Result<ExecutionUnitHandle, FactoryError>
        + Send
        + Sync
        + 'static,
{
    /// Non-blocking factory for `prefix`
    pub fn new(prefix: impl Into<String>, create: F) -> Self {
        Self {
            prefix: prefix.into(),
            blocking: false,
            create,
        }
    }

    /// Factory whose creation runs on the blocking pool
    pub fn blocking(prefix: impl Into<String>, create: F) -> Self {
        Self {
            prefix: prefix.into(),
            blocking: true,
            create,
        }
    }
}

impl<F> VerticleFactory for FnFactory<F>
where
    F: Fn(&str, &LoaderContext) -> Result<ExecutionUnitHandle, FactoryError>
        + Send
        + Sync
        + 'static,
{
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn blocking_create(&self) -> bool {
        self.blocking
    }

    fn create_unit(
        &self,
        name: &str,
        loader: &LoaderContext,
    ) -> Result<ExecutionUnitHandle, FactoryError> {
        (self.create)(name, loader)
    }
}

impl<F> fmt::Debug for FnFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("prefix", &self.prefix)
            .field("blocking", &self.blocking)
            .finish_non_exhaustive()
    }
}

/// Unit that carries nothing but its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleUnit {
    name: String,
}

impl SimpleUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn boxed(name: impl Into<String>) -> ExecutionUnitHandle {
        Box::new(Self::new(name))
    }
}

impl ExecutionUnit for SimpleUnit {
    fn name(&self) -> &str {
        &self.name
    }
}
