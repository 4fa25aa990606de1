//! # System Constants
//!
//! Identifier syntax markers, environment variable names and default values
//! shared across the resolver.

/// Separator in prefix-form identifiers (`<scheme>:<name>`)
pub const PREFIX_SEPARATOR: char = ':';

/// Separator in suffix-form identifiers (`<name>.<scheme>`)
pub const SUFFIX_SEPARATOR: char = '.';

/// Environment variable names read by configuration and logging
pub mod env_vars {
    /// Prefix for configuration overrides, e.g. `VERTICLE__DEFAULT_SCHEME`
    pub const CONFIG_PREFIX: &str = "VERTICLE";
    pub const ENVIRONMENT: &str = "VERTICLE_ENV";
    pub const APP_ENVIRONMENT: &str = "APP_ENV";
    pub const LOG_FORMAT: &str = "VERTICLE_LOG_FORMAT";
}

pub mod defaults {
    pub const MAX_BLOCKING_CREATIONS: usize = 16;

    /// Scheme served by the namespace script factory
    pub const SCRIPT_SCHEME: &str = "clj";
    pub const SCRIPT_EXTENSION: &str = "clj";
}

/// Operation names used in structured registry logs
pub mod operations {
    pub const REGISTER: &str = "register";
    pub const OVERRIDE: &str = "override";
    pub const UNREGISTER: &str = "unregister";
    pub const RESOLVE: &str = "resolve";
}
