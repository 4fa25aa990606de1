//! # Registry Infrastructure
//!
//! Scheme-keyed registry of verticle factories.
//!
//! ## Overview
//!
//! Each registered factory is wrapped in an immutable [`FactoryDescriptor`]
//! that captures its scheme and blocking declaration at registration time.
//! The registry publishes descriptors through copy-on-write snapshots, so
//! lookups never observe a half-applied registration or override.
//!
//! ## Architecture
//!
//! ```text
//! FactoryRegistry
//! ├── RegistrySnapshot    (immutable table published per write)
//! └── FactoryDescriptor   (scheme + blocking flag + factory handle)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use verticle_resolver::factory::{HostContext, ScriptFactory};
//! use verticle_resolver::registry::{FactoryRegistry, RegistrationMode};
//!
//! let registry = FactoryRegistry::new(HostContext::new("example"));
//! registry.register(ScriptFactory::new(), RegistrationMode::Exclusive).unwrap();
//!
//! let descriptor = registry.lookup("clj").unwrap();
//! assert!(descriptor.blocking());
//! ```

pub mod descriptor;
pub mod factory_registry;

// Re-export main types for easy access
pub use descriptor::{DescriptorInfo, FactoryDescriptor};
pub use factory_registry::{FactoryRegistry, RegistrationMode, RegistryStats, RegistrySnapshot};
