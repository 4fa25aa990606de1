#![allow(dead_code)]

pub mod strategies;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use verticle_resolver::config::ResolverConfig;
use verticle_resolver::error::FactoryError;
use verticle_resolver::factory::{
    ExecutionUnitHandle, HostContext, LoaderContext, SimpleUnit, VerticleFactory,
};
use verticle_resolver::resolver::DeploymentResolver;

/// Factory that records every name it is asked to create
#[derive(Debug, Clone)]
pub struct RecordingFactory {
    prefix: String,
    blocking: bool,
    delay: Option<Duration>,
    tag: String,
    calls: Arc<Mutex<Vec<String>>>,
    init_hosts: Arc<Mutex<Vec<String>>>,
}

impl RecordingFactory {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            blocking: false,
            delay: None,
            tag: prefix.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            init_hosts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Blocking factory that sleeps the calling thread before creating
    pub fn sleeping(prefix: &str, delay: Duration) -> Self {
        Self {
            blocking: true,
            delay: Some(delay),
            ..Self::new(prefix)
        }
    }

    /// Units are named `<tag>/<name>` so callers can tell factories apart
    pub fn tagged(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn init_hosts(&self) -> Vec<String> {
        self.init_hosts.lock().clone()
    }
}

impl VerticleFactory for RecordingFactory {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn blocking_create(&self) -> bool {
        self.blocking
    }

    fn init(&mut self, host: &HostContext) {
        self.init_hosts.lock().push(host.name().to_string());
    }

    fn create_unit(
        &self,
        name: &str,
        _loader: &LoaderContext,
    ) -> Result<ExecutionUnitHandle, FactoryError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.calls.lock().push(name.to_string());
        Ok(SimpleUnit::boxed(format!("{}/{name}", self.tag)))
    }
}

pub fn test_config() -> ResolverConfig {
    ResolverConfig::default()
}

pub fn test_resolver(config: ResolverConfig) -> Arc<DeploymentResolver> {
    let resolver = DeploymentResolver::from_config(&config, HostContext::new("integration"))
        .expect("test config is valid");
    Arc::new(resolver)
}
