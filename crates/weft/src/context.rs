// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template contexts.
//!
//! A [`Context`] is the flat string-keyed value map templates execute
//! against. Two merge operations exist with different precedence:
//!
//! - [`apply_defaults`](Context::apply_defaults) only fills keys that are
//!   not present yet (existing values win),
//! - [`merge`](Context::merge) always overwrites.
//!
//! The backing map is ordered, so iteration and rendering are
//! deterministic. Typed accessors coerce loosely-typed values at the
//! boundary instead of scattering casts through call sites.

use std::collections::BTreeMap;

use minijinja::value::ValueKind;
use minijinja::Value;

/// Flat string-keyed template context.
#[derive(Debug, Clone, Default)]
pub struct Context(BTreeMap<String, Value>);

impl Context {
    /// Creates an empty context.
    pub fn new() -> Context {
        Context::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the context holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets a value under `key`, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Sets values from `defaults` only where the key is not present yet.
    pub fn apply_defaults(&mut self, defaults: &Context) {
        for (key, value) in &defaults.0 {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Merges `source` in, overwriting existing keys.
    pub fn merge(&mut self, source: &Context) {
        for (key, value) in &source.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Builds the engine value handed to template execution. Values
    /// pass through the engine's serializer unchanged, so safe strings
    /// stay safe.
    pub fn to_value(&self) -> Value {
        Value::from_serialize(&self.0)
    }

    /// String view of the value under `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Boolean under `key`, coerced per [`coerce_bool`].
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        coerce_bool(self.get(key)?)
    }

    /// Integer under `key`; numeric values convert, strings parse.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        if let Ok(n) = i64::try_from(value.clone()) {
            return Some(n);
        }
        value.as_str()?.trim().parse().ok()
    }

    /// Float under `key`; numeric values convert, strings parse.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        if let Ok(n) = f64::try_from(value.clone()) {
            return Some(n);
        }
        value.as_str()?.trim().parse().ok()
    }

    /// Builds a context from a definition's JSON value map.
    pub(crate) fn from_json_map(map: &BTreeMap<String, serde_json::Value>) -> Context {
        map.iter()
            .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
            .collect()
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Context {
        Context(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Context {
    fn from(map: BTreeMap<String, Value>) -> Context {
        Context(map)
    }
}

/// Coerces a loosely-typed value to a boolean.
///
/// Rules: booleans pass through; numbers are true when non-zero; the
/// strings `"1"`, `"true"`, `"yes"`, `"on"` (case-insensitive) are true
/// and `""`, `"0"`, `"false"`, `"no"`, `"off"` are false; none/undefined
/// are false. Anything else does not coerce.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value.kind() {
        ValueKind::Bool | ValueKind::Number => Some(value.is_true()),
        ValueKind::None | ValueKind::Undefined => Some(false),
        ValueKind::String => match value.as_str()?.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "" | "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_only() {
        let mut ctx = Context::new();
        ctx.insert("a", 2);
        ctx.insert("b", 3);
        let mut defaults = Context::new();
        defaults.insert("a", 1);
        defaults.insert("c", 4);
        ctx.apply_defaults(&defaults);
        assert_eq!(ctx.get_i64("a"), Some(2));
        assert_eq!(ctx.get_i64("b"), Some(3));
        assert_eq!(ctx.get_i64("c"), Some(4));
    }

    #[test]
    fn test_merge_overwrites() {
        let mut ctx = Context::new();
        ctx.insert("a", 2);
        let mut source = Context::new();
        source.insert("a", 1);
        ctx.merge(&source);
        assert_eq!(ctx.get_i64("a"), Some(1));
    }

    #[test]
    fn test_bool_coercion() {
        let mut ctx = Context::new();
        ctx.insert("yes", "YES");
        ctx.insert("off", "off");
        ctx.insert("zero", 0);
        ctx.insert("one", 1);
        ctx.insert("plain", true);
        ctx.insert("junk", "maybe");
        assert_eq!(ctx.get_bool("yes"), Some(true));
        assert_eq!(ctx.get_bool("off"), Some(false));
        assert_eq!(ctx.get_bool("zero"), Some(false));
        assert_eq!(ctx.get_bool("one"), Some(true));
        assert_eq!(ctx.get_bool("plain"), Some(true));
        assert_eq!(ctx.get_bool("junk"), None);
        assert_eq!(ctx.get_bool("missing"), None);
    }

    #[test]
    fn test_numeric_accessors_parse_strings() {
        let mut ctx = Context::new();
        ctx.insert("n", "42");
        ctx.insert("f", "2.5");
        assert_eq!(ctx.get_i64("n"), Some(42));
        assert_eq!(ctx.get_f64("f"), Some(2.5));
    }
}
