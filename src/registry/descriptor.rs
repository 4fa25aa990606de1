//! Registered factory entries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::factory::VerticleFactory;

/// A factory bound to a scheme, immutable once published
pub struct FactoryDescriptor {
    scheme: String,
    blocking: bool,
    factory: Arc<dyn VerticleFactory>,
    registered_at: DateTime<Utc>,
    /// Position in the match order; kept across overrides
    sequence: u64,
}

impl FactoryDescriptor {
    pub(crate) fn new(
        scheme: String,
        blocking: bool,
        factory: Arc<dyn VerticleFactory>,
        sequence: u64,
    ) -> Self {
        Self {
            scheme,
            blocking,
            factory,
            registered_at: Utc::now(),
            sequence,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Blocking flag captured once at registration
    pub fn blocking(&self) -> bool {
        self.blocking
    }

    pub fn factory(&self) -> &Arc<dyn VerticleFactory> {
        &self.factory
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn info(&self) -> DescriptorInfo {
        DescriptorInfo {
            scheme: self.scheme.clone(),
            blocking: self.blocking,
            factory_prefix: self.factory.prefix().to_string(),
            registered_at: self.registered_at,
        }
    }
}

impl fmt::Debug for FactoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryDescriptor")
            .field("scheme", &self.scheme)
            .field("blocking", &self.blocking)
            .field("factory_prefix", &self.factory.prefix())
            .field("registered_at", &self.registered_at)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Serializable view of a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorInfo {
    pub scheme: String,
    pub blocking: bool,
    pub factory_prefix: String,
    pub registered_at: DateTime<Utc>,
}
