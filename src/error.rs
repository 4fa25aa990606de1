//! # Resolver Error Types
//!
//! Structured error handling for identifier resolution, factory registration
//! and unit creation using thiserror.
//!
//! Factories report [`FactoryError`]; the resolver wraps it together with the
//! raw deployment identifier into [`ResolverError::Creation`] so the original
//! cause stays reachable through [`std::error::Error::source`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ConfigurationError;

/// Failure reported by a factory while creating an execution unit
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Unit not found: {name}")]
    UnitNotFound { name: String },

    #[error("Failed to load unit '{name}': {source}")]
    LoadFailure {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl FactoryError {
    /// Create a unit not found error
    pub fn unit_not_found(name: impl Into<String>) -> Self {
        Self::UnitNotFound { name: name.into() }
    }

    /// Create a load failure wrapping the underlying cause
    pub fn load_failure(name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::LoadFailure {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnitNotFound { .. } => ErrorKind::UnitNotFound,
            Self::LoadFailure { .. } => ErrorKind::LoadFailure,
        }
    }

    /// Name the factory was asked to create
    pub fn name(&self) -> &str {
        match self {
            Self::UnitNotFound { name } | Self::LoadFailure { name, .. } => name,
        }
    }
}

/// Coarse classification of every failure the crate surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No registered scheme matches the identifier shape
    UnresolvedScheme,
    /// A scheme matched but its registry entry vanished before lookup
    UnknownScheme,
    /// Registration conflict
    DuplicateScheme,
    /// Scheme overlaps a registered scheme
    AmbiguousScheme,
    /// Scheme is empty or contains reserved characters
    InvalidScheme,
    /// Factory could not locate the named unit
    UnitNotFound,
    /// Factory-internal error during creation
    LoadFailure,
    /// Blocking creation pool has been shut down
    ShutDown,
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::UnresolvedScheme => "unresolved_scheme",
            ErrorKind::UnknownScheme => "unknown_scheme",
            ErrorKind::DuplicateScheme => "duplicate_scheme",
            ErrorKind::AmbiguousScheme => "ambiguous_scheme",
            ErrorKind::InvalidScheme => "invalid_scheme",
            ErrorKind::UnitNotFound => "unit_not_found",
            ErrorKind::LoadFailure => "load_failure",
            ErrorKind::ShutDown => "shut_down",
            ErrorKind::Configuration => "configuration",
        };
        f.write_str(label)
    }
}

/// Errors surfaced by the registry and the deployment resolver
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("No registered scheme matches identifier '{identifier}'")]
    UnresolvedScheme { identifier: String },

    #[error("Scheme '{scheme}' matched identifier '{identifier}' but is no longer registered")]
    UnknownScheme { identifier: String, scheme: String },

    #[error("A factory is already registered for scheme '{scheme}'")]
    DuplicateScheme { scheme: String },

    #[error("Scheme '{scheme}' overlaps registered scheme '{conflicting}'")]
    AmbiguousScheme { scheme: String, conflicting: String },

    #[error("Invalid scheme '{scheme}': {reason}")]
    InvalidScheme { scheme: String, reason: String },

    #[error("Failed to create unit for '{identifier}': {source}")]
    Creation {
        identifier: String,
        #[source]
        source: FactoryError,
    },

    #[error("Cannot create '{identifier}': blocking creation pool is shut down")]
    ShutDown { identifier: String },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ResolverError {
    /// Create an unresolved scheme error
    pub fn unresolved_scheme(identifier: impl Into<String>) -> Self {
        Self::UnresolvedScheme {
            identifier: identifier.into(),
        }
    }

    /// Create an unknown scheme error
    pub fn unknown_scheme(identifier: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self::UnknownScheme {
            identifier: identifier.into(),
            scheme: scheme.into(),
        }
    }

    /// Create a duplicate scheme error
    pub fn duplicate_scheme(scheme: impl Into<String>) -> Self {
        Self::DuplicateScheme {
            scheme: scheme.into(),
        }
    }

    /// Create an ambiguous scheme error
    pub fn ambiguous_scheme(scheme: impl Into<String>, conflicting: impl Into<String>) -> Self {
        Self::AmbiguousScheme {
            scheme: scheme.into(),
            conflicting: conflicting.into(),
        }
    }

    /// Create an invalid scheme error
    pub fn invalid_scheme(scheme: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScheme {
            scheme: scheme.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a factory failure with the identifier that triggered it
    pub fn creation(identifier: impl Into<String>, source: FactoryError) -> Self {
        Self::Creation {
            identifier: identifier.into(),
            source,
        }
    }

    /// Create a shut down error
    pub fn shut_down(identifier: impl Into<String>) -> Self {
        Self::ShutDown {
            identifier: identifier.into(),
        }
    }

    /// Classify the error; creation failures report the factory's kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnresolvedScheme { .. } => ErrorKind::UnresolvedScheme,
            Self::UnknownScheme { .. } => ErrorKind::UnknownScheme,
            Self::DuplicateScheme { .. } => ErrorKind::DuplicateScheme,
            Self::AmbiguousScheme { .. } => ErrorKind::AmbiguousScheme,
            Self::InvalidScheme { .. } => ErrorKind::InvalidScheme,
            Self::Creation { source, .. } => source.kind(),
            Self::ShutDown { .. } => ErrorKind::ShutDown,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Raw deployment identifier the failure relates to, if any
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::UnresolvedScheme { identifier }
            | Self::UnknownScheme { identifier, .. }
            | Self::Creation { identifier, .. }
            | Self::ShutDown { identifier } => Some(identifier),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
