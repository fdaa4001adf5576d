//! Structured configuration sections
//!
//! A thin typed view over a YAML mapping. Getters never fail: values of the
//! wrong shape read as absent. The `*_or_insert` helpers write a default back
//! into the mapping and flag the document as normalized, so the caller knows
//! the configuration has to be persisted again.

use serde_yaml::{Mapping, Value};

/// A mutable view of one mapping inside a configuration document
pub struct ConfigSection<'a> {
    map: &'a mut Mapping,
    normalized: &'a mut bool,
}

impl<'a> ConfigSection<'a> {
    /// Wrap a root mapping. `normalized` is set whenever a default is written back.
    pub fn new(map: &'a mut Mapping, normalized: &'a mut bool) -> Self {
        Self { map, normalized }
    }

    /// Keys of this section, in document order
    pub fn keys(&self) -> Vec<String> {
        self.map.keys().filter_map(key_to_string).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map
            .get(key)
            .is_some_and(|value| !value.is_null())
    }

    /// String value. Scalars (numbers, booleans) are read as their text form.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.map.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Integer value. Numeric strings are accepted.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.map.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.map.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// List of strings. A single scalar is read as a one-element list.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.map.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(value) => scalar_to_string(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// String value, writing `default` back when the key is absent
    pub fn string_or_insert(&mut self, key: &str, default: &str) -> String {
        if let Some(value) = self.get_string(key) {
            return value;
        }
        self.set(key, Value::String(default.to_string()));
        default.to_string()
    }

    /// Boolean value, writing `default` back when the key is absent
    pub fn bool_or_insert(&mut self, key: &str, default: bool) -> bool {
        if let Some(value) = self.get_bool(key) {
            return value;
        }
        self.set(key, Value::Bool(default));
        default
    }

    /// Set a value and flag the document as normalized
    pub fn set(&mut self, key: &str, value: Value) {
        self.map.insert(Value::String(key.to_string()), value);
        *self.normalized = true;
    }

    /// Nested section, if present and a mapping
    pub fn section(&mut self, key: &str) -> Option<ConfigSection<'_>> {
        match self.map.get_mut(key) {
            Some(Value::Mapping(map)) => Some(ConfigSection {
                map,
                normalized: &mut *self.normalized,
            }),
            _ => None,
        }
    }

    /// Nested section, created empty (and flagged) when absent or not a mapping
    pub fn ensure_section(&mut self, key: &str) -> ConfigSection<'_> {
        let is_mapping = matches!(self.map.get(key), Some(Value::Mapping(_)));
        if !is_mapping {
            self.set(key, Value::Mapping(Mapping::new()));
        }

        let map = match self.map.get_mut(key) {
            Some(Value::Mapping(map)) => map,
            // just inserted above
            _ => unreachable!("section '{key}' was inserted as a mapping"),
        };
        ConfigSection {
            map,
            normalized: &mut *self.normalized,
        }
    }
}

fn key_to_string(key: &Value) -> Option<String> {
    scalar_to_string(key)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
