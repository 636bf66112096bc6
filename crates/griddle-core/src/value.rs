#![forbid(unsafe_code)]

//! Generic tree-shaped value for filter state.
//!
//! Filter mappings are string-keyed trees: leaves are scalars or lists,
//! interior nodes are maps. `BTreeMap` keeps key order deterministic.
//! Values serialize as plain JSON (untagged), so a persisted grid bookmark
//! like `{"status": "enabled", "price": {"from": "10"}}` round-trips
//! without any enum tagging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A filter value: scalar leaf, list leaf, or nested map.
///
/// Lists are leaves from the grid's point of view (multiselect filters);
/// key-path traversal never descends into them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null. Note: null is *not* an empty value for the purposes
    /// of the apply-time purge; only empty strings are.
    #[default]
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// An empty map, the root shape of every filter mapping.
    #[must_use]
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for the empty-string leaf, the one value the apply step purges.
    #[must_use]
    pub fn is_empty_str(&self) -> bool {
        matches!(self, Value::Str(s) if s.is_empty())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a dotted path. An empty path addresses the value itself.
    #[must_use]
    pub fn at(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        match (self, path.split_once('.')) {
            (Value::Map(map), None) => map.get(path),
            (Value::Map(map), Some((head, rest))) => map.get(head)?.at(rest),
            _ => None,
        }
    }

    /// Write `value` at a dotted path, creating intermediate maps as needed
    /// and overwriting non-map nodes in the way. An empty path replaces the
    /// value wholesale.
    pub fn set_at(&mut self, path: &str, value: Value) {
        if path.is_empty() {
            *self = value;
            return;
        }
        if !matches!(self, Value::Map(_)) {
            *self = Value::map();
        }
        if let Value::Map(map) = self {
            match path.split_once('.') {
                None => {
                    map.insert(path.to_owned(), value);
                }
                Some((head, rest)) => map
                    .entry(head.to_owned())
                    .or_insert_with(Value::map)
                    .set_at(rest, value),
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let mut root = Value::map();
        root.set_at("status", Value::from("enabled"));
        root.set_at("price.from", Value::from("10"));
        root.set_at("price.to", Value::from("99"));
        root
    }

    #[test]
    fn at_walks_nested_maps() {
        let root = sample();
        assert_eq!(root.at("status"), Some(&Value::from("enabled")));
        assert_eq!(root.at("price.from"), Some(&Value::from("10")));
        assert_eq!(root.at("price.missing"), None);
        assert_eq!(root.at("nope"), None);
    }

    #[test]
    fn empty_path_is_identity() {
        let root = sample();
        assert_eq!(root.at(""), Some(&root));
    }

    #[test]
    fn set_at_autovivifies_maps() {
        let mut root = Value::map();
        root.set_at("a.b.c", Value::from("x"));
        assert_eq!(root.at("a.b.c"), Some(&Value::from("x")));
        assert!(root.at("a.b").is_some_and(|v| v.as_map().is_some()));
    }

    #[test]
    fn set_at_overwrites_leaf_in_the_way() {
        let mut root = Value::map();
        root.set_at("a", Value::from("leaf"));
        root.set_at("a.b", Value::from("x"));
        assert_eq!(root.at("a.b"), Some(&Value::from("x")));
    }

    #[test]
    fn empty_str_detection() {
        assert!(Value::from("").is_empty_str());
        assert!(!Value::from("x").is_empty_str());
        assert!(!Value::Null.is_empty_str());
    }

    #[test]
    fn serde_round_trip_is_plain_json() {
        let root = sample();
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "enabled",
                "price": { "from": "10", "to": "99" },
            })
        );
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, root);
    }

    #[test]
    fn serde_null_and_list() {
        let json = serde_json::json!({ "ids": ["1", "2"], "flag": null });
        let value: Value = serde_json::from_value(json).unwrap();
        assert_eq!(
            value.at("ids"),
            Some(&Value::List(vec![Value::from("1"), Value::from("2")]))
        );
        assert_eq!(value.at("flag"), Some(&Value::Null));
    }
}
