use proptest::prelude::*;

/// Scheme names accepted by the registry
pub fn scheme_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,5}"
}

/// Arbitrary bare names, including separators and underscores
pub fn bare_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.-]{0,32}"
}

/// Bare names without any underscore
pub fn kebab_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9.-]{0,32}"
}

/// Dotted namespace names with snake_case segments
pub fn namespace_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..4).prop_map(|segments| segments.join("."))
}
