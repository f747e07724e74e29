//! Key representations inside a store container.
//!
//! Containers are keyed by canonical strings. Caller-supplied maps may also
//! carry the symbol form of a key (`":name"`); those are folded into the
//! canonical form at every container boundary. When both forms are present
//! the exact string key wins.

use super::{Container, Value};

pub const SYMBOL_SIGIL: char = ':';

/// Strips the symbol sigil, if any.
pub fn canonical_key(key: &str) -> String {
    key.strip_prefix(SYMBOL_SIGIL).unwrap_or(key).to_string()
}

/// The symbol-form alternate of a canonical key.
pub fn symbol_key(key: &str) -> String {
    format!("{}{}", SYMBOL_SIGIL, canonical_key(key))
}

pub fn is_symbol_key(key: &str) -> bool {
    key.starts_with(SYMBOL_SIGIL) && key.len() > 1
}

/// Folds symbol-form keys of the top-level map into canonical keys.
pub fn stringify_keys(map: Container) -> Container {
    let mut result = Container::new();
    let mut alternates = Vec::new();

    for (key, value) in map {
        if is_symbol_key(&key) {
            alternates.push((canonical_key(&key), value));
        } else {
            result.insert(key, value);
        }
    }

    for (key, value) in alternates {
        result.entry(key).or_insert(value);
    }

    result
}

/// Same as [`stringify_keys`], applied to every nested map.
pub fn deep_stringify_keys(value: Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(
            stringify_keys(map)
                .into_iter()
                .map(|(k, v)| (k, deep_stringify_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(deep_stringify_keys).collect()),
        other => other,
    }
}
