//! # Typed Connection Options
//!
//! Purpose: Hold connection parameters derived from a URL query string,
//! URL-embedded credentials, and caller-supplied overrides as one typed
//! mapping.
//!
//! ## Design Principles
//! 1. **Fixed Coercion Table**: Recognized option names and their value
//!    types are declared once, at build time.
//! 2. **Pass-Through Unknowns**: Unrecognized keys survive as raw strings.
//! 3. **Overrides Win**: Merging applies the override side last.
//! 4. **Fail Fast**: A value that does not fit its declared type is an
//!    immediate error naming the option.

use std::collections::BTreeMap;

use crate::error::{RegistryError, RegistryResult};

/// Value shapes a recognized option can coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionKind {
    Int,
    Float,
    Bool,
    List,
}

/// Recognized query options and their declared types. Anything not listed
/// here passes through as a raw string.
const OPTION_KINDS: &[(&str, OptionKind)] = &[
    ("db", OptionKind::Int),
    ("health_check_interval", OptionKind::Int),
    ("max_connections", OptionKind::Int),
    ("readonly", OptionKind::Bool),
    ("retry_on_error", OptionKind::List),
    ("retry_on_timeout", OptionKind::Bool),
    ("socket_timeout", OptionKind::Float),
    ("socket_connect_timeout", OptionKind::Float),
    ("socket_keepalive", OptionKind::Bool),
    ("ssl", OptionKind::Bool),
    ("ssl_check_hostname", OptionKind::Bool),
];

/// One typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
    Str(String),
}

impl OptionValue {
    /// Returns the string payload for `Str` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the boolean payload for `Bool` values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer payload for `Int` values.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

/// Ordered mapping of option name to typed value.
///
/// Built by applying URL-derived values first and explicit overrides second,
/// so the override side is always authoritative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ConnectionOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        ConnectionOptions::default()
    }

    /// True when no options are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of options present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Looks up an option by name.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Sets an option, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    /// Removes an option, returning it when present.
    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        self.values.remove(name)
    }

    /// Returns the string payload of `name` when present and string-typed.
    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    /// Returns the boolean payload of `name` when present and bool-typed.
    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(OptionValue::as_bool)
    }

    /// Returns the integer payload of `name` when present and int-typed.
    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(OptionValue::as_int)
    }

    /// Iterates over options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Applies `overrides` on top of the current values. Entries on the
    /// override side replace existing entries with the same name.
    pub fn merge(&mut self, overrides: ConnectionOptions) {
        for (name, value) in overrides.values {
            self.values.insert(name, value);
        }
    }

    /// Inserts a query parameter, coercing recognized names per the table.
    ///
    /// An empty boolean value drops the option entirely. A failed coercion
    /// fails with `InvalidOptionValue` naming the option.
    pub(crate) fn insert_query_param(&mut self, name: &str, raw: &str) -> RegistryResult<()> {
        let kind = OPTION_KINDS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, kind)| *kind);

        let value = match kind {
            Some(kind) => match coerce(name, kind, raw)? {
                Some(value) => value,
                None => return Ok(()),
            },
            None => OptionValue::Str(raw.to_string()),
        };

        self.values.insert(name.to_string(), value);
        Ok(())
    }
}

fn coerce(name: &str, kind: OptionKind, raw: &str) -> RegistryResult<Option<OptionValue>> {
    let invalid = || RegistryError::InvalidOptionValue {
        option: name.to_string(),
    };

    let value = match kind {
        OptionKind::Int => OptionValue::Int(raw.parse().map_err(|_| invalid())?),
        OptionKind::Float => OptionValue::Float(raw.parse().map_err(|_| invalid())?),
        OptionKind::Bool => match parse_bool(raw) {
            Some(value) => OptionValue::Bool(value),
            None => return Ok(None),
        },
        OptionKind::List => OptionValue::List(
            raw.split(',')
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    };

    Ok(Some(value))
}

/// Boolean coercion matching the redis client convention: an empty string is
/// no value at all, a handful of no-words mean false, everything else true.
fn parse_bool(raw: &str) -> Option<bool> {
    if raw.is_empty() {
        return None;
    }
    let falsy = matches!(
        raw.to_ascii_uppercase().as_str(),
        "0" | "F" | "FALSE" | "N" | "NO"
    );
    Some(!falsy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_coercion() {
        let mut options = ConnectionOptions::new();
        options.insert_query_param("db", "3").unwrap();
        options.insert_query_param("max_connections", "10").unwrap();
        assert_eq!(options.get("db"), Some(&OptionValue::Int(3)));
        assert_eq!(options.int_value("max_connections"), Some(10));
    }

    #[test]
    fn test_float_coercion() {
        let mut options = ConnectionOptions::new();
        options.insert_query_param("socket_timeout", "1.5").unwrap();
        assert_eq!(options.get("socket_timeout"), Some(&OptionValue::Float(1.5)));
    }

    #[test]
    fn test_bool_coercion() {
        let mut options = ConnectionOptions::new();
        options.insert_query_param("ssl", "1").unwrap();
        options.insert_query_param("readonly", "False").unwrap();
        options.insert_query_param("retry_on_timeout", "no").unwrap();
        options.insert_query_param("socket_keepalive", "yes").unwrap();
        assert_eq!(options.bool_value("ssl"), Some(true));
        assert_eq!(options.bool_value("readonly"), Some(false));
        assert_eq!(options.bool_value("retry_on_timeout"), Some(false));
        assert_eq!(options.bool_value("socket_keepalive"), Some(true));
    }

    #[test]
    fn test_empty_bool_is_dropped() {
        let mut options = ConnectionOptions::new();
        options.insert_query_param("ssl", "").unwrap();
        assert!(!options.contains("ssl"));
    }

    #[test]
    fn test_list_coercion() {
        let mut options = ConnectionOptions::new();
        options.insert_query_param("retry_on_error", "timeout,busy").unwrap();
        assert_eq!(
            options.get("retry_on_error"),
            Some(&OptionValue::List(vec![
                "timeout".to_string(),
                "busy".to_string()
            ]))
        );
    }

    #[test]
    fn test_invalid_value_names_option() {
        let mut options = ConnectionOptions::new();
        let err = options.insert_query_param("db", "not-a-number").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidOptionValue { option } if option == "db"
        ));

        let err = options
            .insert_query_param("socket_timeout", "soon")
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidOptionValue { option } if option == "socket_timeout"
        ));
    }

    #[test]
    fn test_unknown_key_passes_through() {
        let mut options = ConnectionOptions::new();
        options.insert_query_param("client_name", "worker-1").unwrap();
        assert_eq!(options.str_value("client_name"), Some("worker-1"));
    }

    #[test]
    fn test_merge_overrides_win() {
        let mut options = ConnectionOptions::new();
        options.set("password", OptionValue::Str("from-url".into()));
        options.set("db", OptionValue::Int(1));

        let mut overrides = ConnectionOptions::new();
        overrides.set("password", OptionValue::Str("from-caller".into()));

        options.merge(overrides);
        assert_eq!(options.str_value("password"), Some("from-caller"));
        assert_eq!(options.int_value("db"), Some(1));
    }
}
