//! # Deployment Identifiers
//!
//! Parsing of raw deployment identifiers into a scheme and a bare name.
//!
//! Three shapes are recognized for a scheme `s`:
//!
//! ```text
//! s:<name>      prefix form
//! <name>.s      suffix form
//! s:<name>.s    both; the suffix is stripped first, then the prefix
//! ```
//!
//! Anything else is a bare identifier. Parsing never fails; a missing scheme
//! is reported later by the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{PREFIX_SEPARATOR, SUFFIX_SEPARATOR};
use crate::normalizer::NameNormalizer;

/// Which scheme markers were found on an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierForm {
    /// `<scheme>:<name>`
    Prefix,
    /// `<name>.<scheme>`
    Suffix,
    /// `<scheme>:<name>.<scheme>`
    Both,
    /// `<name>`, scheme supplied out of band or not at all
    Bare,
}

/// A raw identifier split into scheme and bare name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentIdentifier {
    raw: String,
    scheme: Option<String>,
    raw_name: String,
    form: IdentifierForm,
}

impl DeploymentIdentifier {
    /// Parse `raw` against candidate schemes; the first scheme that matches wins
    pub fn parse<'a, I>(raw: &str, schemes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        schemes
            .into_iter()
            .find_map(|scheme| Self::parse_for(raw, scheme))
            .unwrap_or_else(|| Self::bare(raw))
    }

    /// Parse `raw` against a single scheme, `None` if neither marker is present
    pub fn parse_for(raw: &str, scheme: &str) -> Option<Self> {
        if scheme.is_empty() {
            return None;
        }

        let (name, form) = strip_scheme(raw, scheme)?;
        Some(Self {
            raw: raw.to_string(),
            scheme: Some(scheme.to_string()),
            raw_name: name.to_string(),
            form,
        })
    }

    /// Identifier with no scheme; the whole input is the name
    pub fn bare(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            scheme: None,
            raw_name: raw.to_string(),
            form: IdentifierForm::Bare,
        }
    }

    /// Attach an out-of-band scheme to a bare identifier
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn form(&self) -> IdentifierForm {
        self.form
    }

    /// Bare name after applying `normalizer`
    pub fn normalized_name(&self, normalizer: &NameNormalizer) -> String {
        normalizer.normalize(&self.raw_name)
    }
}

impl fmt::Display for DeploymentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Why `scheme` cannot be used as both a `<scheme>:` and a `.<scheme>` marker
pub fn scheme_syntax_error(scheme: &str) -> Option<String> {
    if scheme.is_empty() {
        return Some("scheme must not be empty".to_string());
    }

    scheme
        .chars()
        .find(|c| *c == PREFIX_SEPARATOR || *c == SUFFIX_SEPARATOR || c.is_whitespace())
        .map(|c| format!("scheme must not contain {c:?}"))
}

/// Strip the suffix marker, then the prefix marker, for one scheme
fn strip_scheme<'a>(raw: &'a str, scheme: &str) -> Option<(&'a str, IdentifierForm)> {
    let mut name = raw;

    let had_suffix = match name
        .strip_suffix(scheme)
        .and_then(|rest| rest.strip_suffix(SUFFIX_SEPARATOR))
    {
        Some(rest) => {
            name = rest;
            true
        }
        None => false,
    };

    let had_prefix = match name
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(PREFIX_SEPARATOR))
    {
        Some(rest) => {
            name = rest;
            true
        }
        None => false,
    };

    let form = match (had_prefix, had_suffix) {
        (true, true) => IdentifierForm::Both,
        (true, false) => IdentifierForm::Prefix,
        (false, true) => IdentifierForm::Suffix,
        (false, false) => return None,
    };
    Some((name, form))
}
