//! # Name Normalizer
//!
//! Declarative rewrite rules applied to the bare name of a deployment
//! identifier, bridging file-naming conventions (`my_app`) and guest-language
//! naming conventions (`my-app`).
//!
//! Rules are applied in order. A rule set is only accepted when no
//! replacement contains any rule's pattern. For single-character patterns
//! that makes normalization idempotent; multi-character literals can still
//! be formed across a replacement boundary and are the caller's concern.

use crate::config::{ConfigResult, ConfigurationError, NormalizationConfig, RuleConfig};

/// What a rule matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePattern {
    Char(char),
    Literal(String),
}

impl RulePattern {
    fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            RulePattern::Char(c) => c.to_string().into(),
            RulePattern::Literal(s) => s.as_str().into(),
        }
    }
}

impl From<&str> for RulePattern {
    fn from(pattern: &str) -> Self {
        let mut chars = pattern.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => RulePattern::Char(c),
            _ => RulePattern::Literal(pattern.to_string()),
        }
    }
}

impl From<char> for RulePattern {
    fn from(c: char) -> Self {
        RulePattern::Char(c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationRule {
    pattern: RulePattern,
    replacement: String,
}

impl NormalizationRule {
    pub fn new(pattern: impl Into<RulePattern>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn pattern(&self) -> &RulePattern {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    fn apply(&self, name: &str) -> String {
        match &self.pattern {
            RulePattern::Char(c) => name.replace(*c, &self.replacement),
            RulePattern::Literal(s) => name.replace(s.as_str(), &self.replacement),
        }
    }
}

/// Ordered, immutable rule set shared across resolutions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameNormalizer {
    rules: Vec<NormalizationRule>,
}

impl NameNormalizer {
    /// Build a normalizer, rejecting rule sets that could rewrite their own output
    pub fn new(rules: Vec<NormalizationRule>) -> ConfigResult<Self> {
        for (index, rule) in rules.iter().enumerate() {
            let pattern = rule.pattern.as_str();
            if pattern.is_empty() {
                return Err(ConfigurationError::invalid_rule(
                    index,
                    pattern,
                    &rule.replacement,
                    "pattern must not be empty",
                ));
            }

            if let Some(other) = rules
                .iter()
                .find(|other| rule.replacement.contains(&*other.pattern.as_str()))
            {
                return Err(ConfigurationError::invalid_rule(
                    index,
                    pattern,
                    &rule.replacement,
                    format!(
                        "replacement contains pattern '{}' and would not be idempotent",
                        other.pattern.as_str()
                    ),
                ));
            }
        }

        Ok(Self { rules })
    }

    pub fn from_config(config: &NormalizationConfig) -> ConfigResult<Self> {
        Self::new(
            config
                .rules
                .iter()
                .map(|RuleConfig { pattern, replacement }| {
                    NormalizationRule::new(pattern.as_str(), replacement.as_str())
                })
                .collect(),
        )
    }

    /// Normalizer with no rules; names pass through unchanged
    pub fn identity() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[NormalizationRule] {
        &self.rules
    }

    pub fn normalize(&self, name: &str) -> String {
        self.rules
            .iter()
            .fold(name.to_string(), |acc, rule| rule.apply(&acc))
    }
}

impl Default for NameNormalizer {
    /// snake_case to kebab-case
    fn default() -> Self {
        Self {
            rules: vec![NormalizationRule::new('_', "-")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_converts_snake_to_kebab() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.normalize("foo_bar"), "foo-bar");
        assert_eq!(normalizer.normalize("my_app.http_server"), "my-app.http-server");
        assert_eq!(normalizer.normalize("already-kebab"), "already-kebab");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_rules_apply_in_order() {
        let normalizer = NameNormalizer::new(vec![
            NormalizationRule::new("__", "/"),
            NormalizationRule::new('_', "-"),
        ])
        .unwrap();
        assert_eq!(normalizer.normalize("a__b_c"), "a/b-c");
    }

    #[test]
    fn test_from_config_matches_default() {
        let normalizer = NameNormalizer::from_config(&NormalizationConfig::default()).unwrap();
        assert_eq!(normalizer, NameNormalizer::default());
    }

    #[test]
    fn test_rejects_replacement_containing_pattern() {
        let err = NameNormalizer::new(vec![
            NormalizationRule::new('_', "-"),
            NormalizationRule::new('-', "_"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidRule { index: 0, .. }));
    }

    #[test]
    fn test_rejects_empty_pattern() {
        let err = NameNormalizer::new(vec![NormalizationRule::new("", "-")]).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidRule { .. }));
    }

    #[test]
    fn test_identity_passes_through() {
        assert_eq!(NameNormalizer::identity().normalize("foo_bar"), "foo_bar");
    }
}
