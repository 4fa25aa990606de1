//! # Deployment Resolver
//!
//! Orchestration entry point turning a raw deployment identifier into a
//! live execution unit.
//!
//! ## Flow
//!
//! ```text
//! raw identifier
//!   ├── identify: match against registered schemes (first registered wins),
//!   │             fall back to the default scheme for bare names
//!   ├── normalize the bare name
//!   ├── look up the descriptor again (it may have been unregistered)
//!   └── create: inline for non-blocking factories,
//!               on the bounded blocking pool otherwise
//! ```
//!
//! Every resolution is independent: concurrent calls for the same
//! identifier are neither deduplicated nor memoized.

pub mod worker_pool;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::ResolverConfig;
use crate::constants::PREFIX_SEPARATOR;
use crate::error::{ErrorKind, FactoryError, ResolverError, Result};
use crate::factory::{ExecutionUnit, ExecutionUnitHandle, HostContext, LoaderContext};
use crate::identifier::DeploymentIdentifier;
use crate::logging::log_resolution;
use crate::normalizer::NameNormalizer;
use crate::registry::FactoryRegistry;

pub use worker_pool::{BlockingCreationPool, PoolError};

/// A successfully created unit together with how it was resolved
#[derive(Debug)]
pub struct Deployment {
    id: Uuid,
    identifier: DeploymentIdentifier,
    scheme: String,
    normalized_name: String,
    blocking: bool,
    created_at: DateTime<Utc>,
    unit: ExecutionUnitHandle,
}

impl Deployment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn identifier(&self) -> &DeploymentIdentifier {
        &self.identifier
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Name handed to the factory
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Whether creation ran on the blocking pool
    pub fn blocking(&self) -> bool {
        self.blocking
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn unit(&self) -> &dyn ExecutionUnit {
        self.unit.as_ref()
    }

    pub fn into_unit(self) -> ExecutionUnitHandle {
        self.unit
    }
}

/// Per-scheme resolution counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub resolved: u64,
    pub failed: u64,
    pub blocking_dispatches: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub schemes: BTreeMap<String, ResolutionStats>,
    /// Identifiers no scheme matched
    pub unresolved: u64,
    /// Matched schemes that were unregistered before creation
    pub unknown_scheme: u64,
}

/// Resolves deployment identifiers through a shared factory registry
pub struct DeploymentResolver {
    registry: Arc<FactoryRegistry>,
    normalizer: Arc<NameNormalizer>,
    default_scheme: Option<String>,
    loader: LoaderContext,
    pool: BlockingCreationPool,
    stats: DashMap<String, ResolutionStats>,
    unresolved: AtomicU64,
    unknown_scheme: AtomicU64,
}

impl DeploymentResolver {
    pub fn new(
        registry: Arc<FactoryRegistry>,
        normalizer: Arc<NameNormalizer>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            registry,
            normalizer,
            default_scheme: config.default_scheme.clone(),
            loader: LoaderContext::from_config(&config.loader),
            pool: BlockingCreationPool::from_config(&config.worker_pool),
            stats: DashMap::new(),
            unresolved: AtomicU64::new(0),
            unknown_scheme: AtomicU64::new(0),
        }
    }

    /// Validate `config` and build a resolver with an empty registry for `host`
    pub fn from_config(config: &ResolverConfig, host: HostContext) -> Result<Self> {
        config.validate()?;
        let normalizer = NameNormalizer::from_config(&config.normalization)?;
        let registry = FactoryRegistry::with_config(host, &config.registry);

        info!(
            host = registry.host().name(),
            default_scheme = ?config.default_scheme,
            max_blocking_creations = config.worker_pool.max_blocking_creations,
            "Deployment resolver initialized"
        );

        Ok(Self::new(Arc::new(registry), Arc::new(normalizer), config))
    }

    pub fn registry(&self) -> &Arc<FactoryRegistry> {
        &self.registry
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    pub fn default_scheme(&self) -> Option<&str> {
        self.default_scheme.as_deref()
    }

    pub fn loader(&self) -> &LoaderContext {
        &self.loader
    }

    pub fn pool(&self) -> &BlockingCreationPool {
        &self.pool
    }

    /// Determine the scheme and bare name of `raw`
    pub fn identify(&self, raw: &str) -> Result<DeploymentIdentifier> {
        let snapshot = self.registry.snapshot();
        let identifier = DeploymentIdentifier::parse(raw, snapshot.schemes());
        if identifier.scheme().is_some() {
            return Ok(identifier);
        }

        match &self.default_scheme {
            // `x:y` names an unregistered scheme rather than a bare name
            Some(default)
                if !raw.contains(PREFIX_SEPARATOR) && snapshot.lookup(default).is_some() =>
            {
                Ok(identifier.with_scheme(default.clone()))
            }
            _ => Err(ResolverError::unresolved_scheme(raw)),
        }
    }

    /// Resolve `raw` and create its unit
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw: &str) -> Result<Deployment> {
        self.complete(raw, self.identify(raw), &self.loader).await
    }

    /// Resolve with a caller-supplied loader context
    pub async fn resolve_with_loader(
        &self,
        raw: &str,
        loader: &LoaderContext,
    ) -> Result<Deployment> {
        self.complete(raw, self.identify(raw), loader).await
    }

    /// Resolve `raw` under an explicitly chosen scheme
    ///
    /// Scheme markers for `scheme` are still stripped if present; otherwise
    /// the whole input is the bare name. A scheme with no registered factory
    /// is `UnresolvedScheme`.
    pub async fn resolve_as(&self, raw: &str, scheme: &str) -> Result<Deployment> {
        let identified = match self.registry.lookup(scheme) {
            Some(_) => Ok(DeploymentIdentifier::parse_for(raw, scheme)
                .unwrap_or_else(|| DeploymentIdentifier::bare(raw).with_scheme(scheme))),
            None => Err(ResolverError::unresolved_scheme(raw)),
        };
        self.complete(raw, identified, &self.loader).await
    }

    /// Create the unit for an already identified deployment
    pub async fn resolve_identifier(&self, identifier: DeploymentIdentifier) -> Result<Deployment> {
        let raw = identifier.raw().to_string();
        self.complete(&raw, Ok(identifier), &self.loader).await
    }

    /// Resolve several identifiers concurrently; results keep input order
    pub async fn resolve_many<'a, I>(&self, identifiers: I) -> Vec<Result<Deployment>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        join_all(identifiers.into_iter().map(|raw| self.resolve(raw))).await
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            schemes: self
                .stats
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            unknown_scheme: self.unknown_scheme.load(Ordering::Relaxed),
        }
    }

    /// Close the blocking pool; later blocking creations fail with `ShutDown`
    pub fn shutdown(&self) {
        self.pool.close();
        info!(
            host = self.registry.host().name(),
            "Deployment resolver shut down"
        );
    }

    async fn complete(
        &self,
        raw: &str,
        identified: Result<DeploymentIdentifier>,
        loader: &LoaderContext,
    ) -> Result<Deployment> {
        let started = Instant::now();

        let identified = identified.and_then(|identifier| {
            let scheme = identifier
                .scheme()
                .map(str::to_string)
                .ok_or_else(|| ResolverError::unresolved_scheme(raw))?;
            Ok((identifier, scheme))
        });

        let (identifier, scheme) = match identified {
            Ok(pair) => pair,
            Err(e) => {
                self.unresolved.fetch_add(1, Ordering::Relaxed);
                log_resolution(raw, None, None, None, "unresolved", elapsed_ms(started));
                return Err(e);
            }
        };

        let outcome = self.create(identifier, &scheme, loader).await;

        // only schemes with a descriptor get a stats entry
        match &outcome {
            Err(e) if e.kind() == ErrorKind::UnknownScheme => {
                self.unknown_scheme.fetch_add(1, Ordering::Relaxed);
                debug!(identifier = raw, scheme = %scheme, "Scheme unregistered before creation");
                log_resolution(
                    raw,
                    Some(&scheme),
                    None,
                    None,
                    &e.kind().to_string(),
                    elapsed_ms(started),
                );
            }
            Ok(deployment) => {
                self.stats.entry(scheme.clone()).or_default().resolved += 1;
                log_resolution(
                    raw,
                    Some(&scheme),
                    Some(deployment.normalized_name()),
                    Some(deployment.blocking()),
                    "success",
                    elapsed_ms(started),
                );
            }
            Err(e) => {
                self.stats.entry(scheme.clone()).or_default().failed += 1;
                debug!(identifier = raw, scheme = %scheme, error = %e, "Resolution failed");
                log_resolution(
                    raw,
                    Some(&scheme),
                    None,
                    None,
                    &e.kind().to_string(),
                    elapsed_ms(started),
                );
            }
        }

        outcome
    }

    async fn create(
        &self,
        identifier: DeploymentIdentifier,
        scheme: &str,
        loader: &LoaderContext,
    ) -> Result<Deployment> {
        let normalized_name = identifier.normalized_name(&self.normalizer);

        // the scheme may have been unregistered since it was matched
        let descriptor = self
            .registry
            .lookup(scheme)
            .ok_or_else(|| ResolverError::unknown_scheme(identifier.raw(), scheme))?;
        let blocking = descriptor.blocking();

        let created = if blocking {
            self.stats.entry(scheme.to_string()).or_default().blocking_dispatches += 1;

            let name = normalized_name.clone();
            let loader = loader.clone();
            let descriptor = Arc::clone(&descriptor);
            match self
                .pool
                .run(move || descriptor.factory().create_unit(&name, &loader))
                .await
            {
                Ok(created) => created,
                Err(PoolError::Closed) => return Err(ResolverError::shut_down(identifier.raw())),
                Err(PoolError::Panicked(message)) => Err(FactoryError::load_failure(
                    &normalized_name,
                    anyhow::anyhow!("factory panicked: {message}"),
                )),
            }
        } else {
            descriptor.factory().create_unit(&normalized_name, loader)
        };

        let unit = created.map_err(|e| ResolverError::creation(identifier.raw(), e))?;

        Ok(Deployment {
            id: Uuid::new_v4(),
            scheme: scheme.to_string(),
            identifier,
            normalized_name,
            blocking,
            created_at: Utc::now(),
            unit,
        })
    }
}

impl std::fmt::Debug for DeploymentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentResolver")
            .field("registry", &self.registry)
            .field("default_scheme", &self.default_scheme)
            .field("pool_capacity", &self.pool.capacity())
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
