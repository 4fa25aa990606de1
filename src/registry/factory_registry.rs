//! # Factory Registry
//!
//! Scheme-keyed table of factory descriptors with copy-on-write publication.
//!
//! ## Architecture
//!
//! ```text
//! RwLock<Arc<RegistrySnapshot>>
//!   readers: clone the Arc under a short read lock, then work lock-free
//!   writers: build a new snapshot under the write lock and swap it in
//! ```
//!
//! A reader therefore sees either the whole table before a write or the
//! whole table after it, never a partial update.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::descriptor::FactoryDescriptor;
use crate::config::RegistryConfig;
use crate::constants::operations;
use crate::error::{ResolverError, Result};
use crate::factory::{HostContext, VerticleFactory};
use crate::identifier::scheme_syntax_error;
use crate::logging::log_registry_operation;

/// How a registration treats an existing entry for the same scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationMode {
    /// Fail with `DuplicateScheme` if the scheme is taken
    #[default]
    Exclusive,
    /// Replace the existing entry, keeping its match position
    Override,
}

/// Immutable view of the registry at one instant
#[derive(Debug, Default, Clone)]
pub struct RegistrySnapshot {
    entries: HashMap<String, Arc<FactoryDescriptor>>,
    /// Entries sorted by registration sequence
    ordered: Vec<Arc<FactoryDescriptor>>,
}

impl RegistrySnapshot {
    pub fn lookup(&self, scheme: &str) -> Option<&Arc<FactoryDescriptor>> {
        self.entries.get(scheme)
    }

    /// Schemes in match order
    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(|d| d.scheme())
    }

    pub fn descriptors(&self) -> &[Arc<FactoryDescriptor>] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    fn with_entry(&self, descriptor: Arc<FactoryDescriptor>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(descriptor.scheme().to_string(), descriptor);
        Self::from_entries(entries)
    }

    fn without(&self, scheme: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.remove(scheme);
        Self::from_entries(entries)
    }

    fn from_entries(entries: HashMap<String, Arc<FactoryDescriptor>>) -> Self {
        let mut ordered: Vec<_> = entries.values().cloned().collect();
        ordered.sort_by_key(|d| d.sequence());
        Self { entries, ordered }
    }
}

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total_factories: usize,
    pub blocking_factories: usize,
    pub non_blocking_factories: usize,
    pub schemes: Vec<String>,
}

/// Thread-safe registry of factories keyed by scheme
pub struct FactoryRegistry {
    host: HostContext,
    allow_overlapping: bool,
    table: RwLock<Arc<RegistrySnapshot>>,
    next_sequence: AtomicU64,
}

impl FactoryRegistry {
    /// Create an empty registry for `host`
    pub fn new(host: HostContext) -> Self {
        Self::with_config(host, &RegistryConfig::default())
    }

    pub fn with_config(host: HostContext, config: &RegistryConfig) -> Self {
        Self {
            host,
            allow_overlapping: config.allow_overlapping_schemes,
            table: RwLock::new(Arc::new(RegistrySnapshot::default())),
            next_sequence: AtomicU64::new(0),
        }
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    /// Register `factory` under its own prefix and blocking declaration
    pub fn register<F: VerticleFactory>(
        &self,
        factory: F,
        mode: RegistrationMode,
    ) -> Result<Arc<FactoryDescriptor>> {
        let scheme = factory.prefix().to_string();
        let blocking = factory.blocking_create();
        self.register_factory(&scheme, blocking, factory, mode)
    }

    /// Register `factory` under an explicit scheme and blocking flag
    ///
    /// `init` runs before the descriptor is published, outside the write lock.
    /// Conflicts are checked again under the lock, so a registration that loses
    /// a race has already had `init` called on a factory that is then dropped.
    pub fn register_factory<F: VerticleFactory>(
        &self,
        scheme: &str,
        blocking: bool,
        mut factory: F,
        mode: RegistrationMode,
    ) -> Result<Arc<FactoryDescriptor>> {
        validate_scheme(scheme)?;
        self.check_conflicts(&self.snapshot(), scheme, mode)?;

        factory.init(&self.host);
        let factory: Arc<dyn VerticleFactory> = Arc::new(factory);

        let mut table = self.table.write();
        // another writer may have raced us since the pre-check
        self.check_conflicts(&table, scheme, mode)?;

        let previous = table.lookup(scheme).cloned();
        let sequence = previous
            .as_ref()
            .map(|d| d.sequence())
            .unwrap_or_else(|| self.next_sequence.fetch_add(1, Ordering::Relaxed));

        let descriptor = Arc::new(FactoryDescriptor::new(
            scheme.to_string(),
            blocking,
            factory,
            sequence,
        ));
        *table = Arc::new(table.with_entry(descriptor.clone()));
        drop(table);

        let operation = if previous.is_some() {
            operations::OVERRIDE
        } else {
            operations::REGISTER
        };
        log_registry_operation(
            operation,
            scheme,
            "success",
            Some(if blocking { "blocking" } else { "non_blocking" }),
        );

        Ok(descriptor)
    }

    /// Remove the factory for `scheme`, returning it if present
    pub fn unregister(&self, scheme: &str) -> Option<Arc<FactoryDescriptor>> {
        let mut table = self.table.write();
        let removed = table.lookup(scheme).cloned()?;
        *table = Arc::new(table.without(scheme));
        drop(table);

        log_registry_operation(operations::UNREGISTER, scheme, "success", None);
        Some(removed)
    }

    pub fn lookup(&self, scheme: &str) -> Option<Arc<FactoryDescriptor>> {
        self.table.read().lookup(scheme).cloned()
    }

    /// Current published table
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.table.read().clone()
    }

    /// Registered schemes in match order
    pub fn schemes(&self) -> Vec<String> {
        self.snapshot().schemes().map(str::to_string).collect()
    }

    pub fn descriptors(&self) -> Vec<Arc<FactoryDescriptor>> {
        self.snapshot().descriptors().to_vec()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let snapshot = self.snapshot();
        let blocking = snapshot.descriptors().iter().filter(|d| d.blocking()).count();

        RegistryStats {
            total_factories: snapshot.len(),
            blocking_factories: blocking,
            non_blocking_factories: snapshot.len() - blocking,
            schemes: snapshot.schemes().map(str::to_string).collect(),
        }
    }

    fn check_conflicts(
        &self,
        table: &RegistrySnapshot,
        scheme: &str,
        mode: RegistrationMode,
    ) -> Result<()> {
        if table.lookup(scheme).is_some() && mode != RegistrationMode::Override {
            warn!(scheme = scheme, "Rejected duplicate factory registration");
            return Err(ResolverError::duplicate_scheme(scheme));
        }

        if self.allow_overlapping {
            return Ok(());
        }

        if let Some(conflicting) = table.schemes().find(|existing| {
            *existing != scheme && (existing.starts_with(scheme) || scheme.starts_with(existing))
        }) {
            debug!(
                scheme = scheme,
                conflicting = conflicting,
                "Rejected overlapping scheme"
            );
            return Err(ResolverError::ambiguous_scheme(scheme, conflicting));
        }

        Ok(())
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("host", &self.host.name())
            .field("allow_overlapping", &self.allow_overlapping)
            .field("schemes", &self.schemes())
            .finish()
    }
}

/// Schemes must be usable as both `<scheme>:` and `.<scheme>` markers
fn validate_scheme(scheme: &str) -> Result<()> {
    match scheme_syntax_error(scheme) {
        Some(reason) => Err(ResolverError::invalid_scheme(scheme, reason)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::factory::{FnFactory, LoaderContext, ScriptFactory, SimpleUnit};
    use std::sync::Barrier;

    fn tagged_factory(
        scheme: &str,
        tag: &'static str,
    ) -> impl VerticleFactory {
        FnFactory::new(scheme, move |name: &str, _: &LoaderContext| {
            Ok(SimpleUnit::boxed(format!("{tag}:{name}")))
        })
    }

    fn created_by(descriptor: &FactoryDescriptor) -> String {
        descriptor
            .factory()
            .create_unit("sample", &LoaderContext::default())
            .unwrap()
            .name()
            .to_string()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = FactoryRegistry::new(HostContext::default());
        assert!(registry.is_empty());

        let descriptor = registry
            .register(ScriptFactory::new(), RegistrationMode::Exclusive)
            .unwrap();
        assert_eq!(descriptor.scheme(), "clj");
        assert!(descriptor.blocking());

        let found = registry.lookup("clj").unwrap();
        assert!(Arc::ptr_eq(&found, &descriptor));
        assert!(registry.lookup("js").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = FactoryRegistry::new(HostContext::default());
        registry
            .register(tagged_factory("js", "first"), RegistrationMode::Exclusive)
            .unwrap();

        let err = registry
            .register(tagged_factory("js", "second"), RegistrationMode::Exclusive)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateScheme);

        let current = registry.lookup("js").unwrap();
        assert_eq!(created_by(&current), "first:sample");
    }

    #[test]
    fn test_override_replaces_and_keeps_position() {
        let registry = FactoryRegistry::new(HostContext::default());
        registry
            .register(tagged_factory("js", "first"), RegistrationMode::Exclusive)
            .unwrap();
        registry
            .register(tagged_factory("rb", "ruby"), RegistrationMode::Exclusive)
            .unwrap();

        registry
            .register(tagged_factory("js", "second"), RegistrationMode::Override)
            .unwrap();

        assert_eq!(created_by(&registry.lookup("js").unwrap()), "second:sample");
        assert_eq!(registry.schemes(), vec!["js".to_string(), "rb".to_string()]);
    }

    #[test]
    fn test_explicit_scheme_and_blocking_flag() {
        let registry = FactoryRegistry::new(HostContext::default());
        let descriptor = registry
            .register_factory(
                "groovy",
                true,
                tagged_factory("ignored", "g"),
                RegistrationMode::Exclusive,
            )
            .unwrap();

        assert_eq!(descriptor.scheme(), "groovy");
        assert!(descriptor.blocking());
        assert_eq!(descriptor.info().factory_prefix, "ignored");
        assert!(registry.lookup("ignored").is_none());
    }

    #[test]
    fn test_unregister() {
        let registry = FactoryRegistry::new(HostContext::default());
        registry
            .register(tagged_factory("js", "first"), RegistrationMode::Exclusive)
            .unwrap();

        let removed = registry.unregister("js").unwrap();
        assert_eq!(removed.scheme(), "js");
        assert!(registry.lookup("js").is_none());
        assert!(registry.unregister("js").is_none());

        // scheme is free again
        registry
            .register(tagged_factory("js", "again"), RegistrationMode::Exclusive)
            .unwrap();
    }

    #[test]
    fn test_invalid_schemes_rejected() {
        let registry = FactoryRegistry::new(HostContext::default());
        for scheme in ["", "a:b", "a.b", "a b"] {
            let err = registry
                .register_factory(
                    scheme,
                    false,
                    tagged_factory("x", "x"),
                    RegistrationMode::Exclusive,
                )
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidScheme, "scheme {scheme:?}");
        }
    }

    #[test]
    fn test_overlapping_schemes_rejected_unless_allowed() {
        let registry = FactoryRegistry::new(HostContext::default());
        registry
            .register(tagged_factory("clj", "clj"), RegistrationMode::Exclusive)
            .unwrap();

        let err = registry
            .register(tagged_factory("cljs", "cljs"), RegistrationMode::Exclusive)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousScheme);

        let err = registry
            .register(tagged_factory("cl", "cl"), RegistrationMode::Exclusive)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousScheme);

        let permissive = FactoryRegistry::with_config(
            HostContext::default(),
            &RegistryConfig {
                allow_overlapping_schemes: true,
            },
        );
        permissive
            .register(tagged_factory("clj", "clj"), RegistrationMode::Exclusive)
            .unwrap();
        permissive
            .register(tagged_factory("cljs", "cljs"), RegistrationMode::Exclusive)
            .unwrap();
        assert_eq!(permissive.len(), 2);
    }

    #[test]
    fn test_init_receives_host() {
        let host = HostContext::new("init-host");
        let registry = FactoryRegistry::new(host.clone());
        registry
            .register(ScriptFactory::new(), RegistrationMode::Exclusive)
            .unwrap();

        assert_eq!(registry.host().instance_id(), host.instance_id());
    }

    #[test]
    fn test_stats() {
        let registry = FactoryRegistry::new(HostContext::default());
        registry
            .register(ScriptFactory::new(), RegistrationMode::Exclusive)
            .unwrap();
        registry
            .register(tagged_factory("js", "js"), RegistrationMode::Exclusive)
            .unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_factories, 2);
        assert_eq!(stats.blocking_factories, 1);
        assert_eq!(stats.non_blocking_factories, 1);
        assert_eq!(stats.schemes, vec!["clj".to_string(), "js".to_string()]);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let registry = FactoryRegistry::new(HostContext::default());
        registry
            .register(tagged_factory("js", "first"), RegistrationMode::Exclusive)
            .unwrap();

        let before = registry.snapshot();
        registry
            .register(tagged_factory("js", "second"), RegistrationMode::Override)
            .unwrap();
        registry.unregister("js");

        assert_eq!(created_by(before.lookup("js").unwrap()), "first:sample");
        assert!(registry.lookup("js").is_none());
    }

    #[test]
    fn test_concurrent_lookups_see_whole_descriptors() {
        let registry = Arc::new(FactoryRegistry::new(HostContext::default()));
        registry
            .register_factory(
                "js",
                false,
                tagged_factory("js", "v0"),
                RegistrationMode::Exclusive,
            )
            .unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..2_000 {
                        let descriptor = registry.lookup("js").expect("scheme never vanishes");
                        // blocking flag and factory are published together
                        let expected = if descriptor.blocking() {
                            "blocking:sample"
                        } else {
                            "v0:sample"
                        };
                        assert_eq!(created_by(&descriptor), expected);
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            registry
                .register_factory(
                    "js",
                    true,
                    tagged_factory("js", "blocking"),
                    RegistrationMode::Override,
                )
                .unwrap();
            registry
                .register_factory(
                    "js",
                    false,
                    tagged_factory("js", "v0"),
                    RegistrationMode::Override,
                )
                .unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_racing_exclusive_registrations_admit_one() {
        for _ in 0..50 {
            let registry = Arc::new(FactoryRegistry::new(HostContext::default()));
            let barrier = Arc::new(Barrier::new(4));

            let contenders: Vec<_> = (0..4)
                .map(|i| {
                    let registry = Arc::clone(&registry);
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        let tag: &'static str = ["a", "b", "c", "d"][i];
                        barrier.wait();
                        registry.register(tagged_factory("js", tag), RegistrationMode::Exclusive)
                    })
                })
                .collect();

            let results: Vec<_> = contenders
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect();

            let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
            assert_eq!(winners.len(), 1);
            for err in results.iter().filter_map(|r| r.as_ref().err()) {
                assert_eq!(err.kind(), ErrorKind::DuplicateScheme);
            }

            assert_eq!(registry.len(), 1);
            let live = registry.lookup("js").unwrap();
            assert!(Arc::ptr_eq(&live, winners[0]));
        }
    }
}
