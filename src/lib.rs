#![allow(clippy::doc_markdown)] // Allow technical terms like ExecutionUnit in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Verticle Resolver
//!
//! Deployment registry and identifier resolver for pluggable verticle
//! factories.
//!
//! ## Overview
//!
//! A host runtime deploys units of application logic ("verticles") written in
//! several guest languages. Each guest-language backend registers a factory
//! under a short scheme such as `clj`. A deployment identifier names the unit
//! and, through a prefix (`clj:my_app.core`) or suffix (`my_app.core.clj`),
//! the scheme that should create it. The resolver parses the identifier,
//! normalizes the bare name (`my_app` becomes `my-app`) and asks the matching
//! factory for an execution unit.
//!
//! ## Key Features
//!
//! - **Atomic registry**: copy-on-write factory table; lookups never observe
//!   a half-applied registration
//! - **Blocking offload**: factories that declare a blocking create path run
//!   on a bounded pool instead of the async workers
//! - **Typed errors**: every failure carries an [`ErrorKind`] and the raw
//!   identifier, with factory causes preserved
//!
//! ## Module Organization
//!
//! - [`identifier`] - Identifier parsing (prefix, suffix, bare forms)
//! - [`normalizer`] - Bare-name rewrite rules
//! - [`factory`] - Factory capability trait, contexts and built-in factories
//! - [`registry`] - Scheme-keyed factory registry
//! - [`resolver`] - Resolution entry point and blocking pool
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use verticle_resolver::config::ResolverConfig;
//! use verticle_resolver::factory::{HostContext, ScriptFactory};
//! use verticle_resolver::registry::RegistrationMode;
//! use verticle_resolver::resolver::DeploymentResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver =
//!     DeploymentResolver::from_config(&ResolverConfig::default(), HostContext::new("app"))?;
//! resolver.registry().register(ScriptFactory::new(), RegistrationMode::Exclusive)?;
//!
//! // Loads ./my_app/http_server.clj on the blocking pool
//! let deployment = resolver.resolve("clj:my_app.http_server").await?;
//! assert_eq!(deployment.normalized_name(), "my-app.http-server");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod factory;
pub mod identifier;
pub mod logging;
pub mod normalizer;
pub mod registry;
pub mod resolver;

pub use config::{ConfigManager, ConfigurationError, ResolverConfig};
pub use error::{ErrorKind, FactoryError, ResolverError, Result};
pub use factory::{
    ExecutionUnit, ExecutionUnitHandle, FnFactory, HostContext, LoaderContext, ScriptFactory,
    VerticleFactory,
};
pub use identifier::{DeploymentIdentifier, IdentifierForm};
pub use normalizer::{NameNormalizer, NormalizationRule};
pub use registry::{FactoryDescriptor, FactoryRegistry, RegistrationMode};
pub use resolver::{Deployment, DeploymentResolver};
