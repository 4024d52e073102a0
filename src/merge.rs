//! The layered merge engine.
//!
//! Folds one settings layer into an accumulator tree. Presence governs
//! precedence: any value present in the incoming layer replaces the base
//! value, regardless of truthiness. Nested trees merge recursively, arrays
//! are replaced or combined per [`MergeSettings`], and a configured knockout
//! prefix turns incoming markers into deletions.

use crate::tree::Tree;
use crate::value::Value;

/// Override policy for the merge engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSettings {
    /// Replace arrays wholesale (default). When `false`, arrays are combined:
    /// incoming elements are appended after knockout processing.
    pub overwrite_arrays: bool,
    /// In combine mode, recursively merge mapping elements at matching
    /// positions instead of appending them.
    pub merge_hash_arrays: bool,
    /// Marker prefix for deletions. An incoming scalar equal to the prefix
    /// clears the key to the empty string; in combine mode an incoming
    /// element `"{prefix}x"` removes the first `x` from the base array.
    pub knockout_prefix: Option<String>,
    /// Whether an incoming nil overwrites the base value (default) or is
    /// skipped, preserving whatever the base holds.
    pub merge_nil_values: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            overwrite_arrays: true,
            merge_hash_arrays: false,
            knockout_prefix: None,
            merge_nil_values: true,
        }
    }
}

impl MergeSettings {
    fn knockout(&self) -> Option<&str> {
        self.knockout_prefix.as_deref().filter(|p| !p.is_empty())
    }
}

/// Merges `incoming` into `base`, layer semantics: keys only in `base` are
/// untouched, keys only in `incoming` are added, shared keys resolve per the
/// settings.
pub fn merge(base: &mut Tree, incoming: Tree, settings: &MergeSettings) {
    for (key, value) in incoming {
        merge_key(base, key, value, settings);
    }
}

fn merge_key(base: &mut Tree, key: String, incoming: Value, settings: &MergeSettings) {
    match incoming {
        Value::Nil => {
            if settings.merge_nil_values {
                base.insert(key, Value::Nil);
            }
        }
        // A bare knockout marker clears the key (to empty string, the key
        // itself survives), whatever the base held.
        Value::String(s) if settings.knockout() == Some(s.as_str()) => {
            base.insert(key, Value::String(String::new()));
        }
        Value::Tree(incoming_tree) => match base.get_mut(&key) {
            Some(Value::Tree(base_tree)) => merge(base_tree, incoming_tree, settings),
            _ => {
                base.insert(key, Value::Tree(incoming_tree));
            }
        },
        Value::Array(incoming_items) => match base.get_mut(&key) {
            Some(Value::Array(base_items)) if !settings.overwrite_arrays => {
                combine_arrays(base_items, incoming_items, settings);
            }
            _ => {
                base.insert(key, Value::Array(incoming_items));
            }
        },
        other => {
            base.insert(key, other);
        }
    }
}

/// Combine mode: knockout elements remove their first match from the base
/// array and are never appended; all removals apply before any append.
fn combine_arrays(base: &mut Vec<Value>, incoming: Vec<Value>, settings: &MergeSettings) {
    let mut pending = Vec::with_capacity(incoming.len());
    for element in incoming {
        if let Some(prefix) = settings.knockout() {
            if let Value::String(s) = &element {
                if let Some(target) = s.strip_prefix(prefix) {
                    if let Some(position) = base.iter().position(|e| knockout_matches(e, target)) {
                        base.remove(position);
                    }
                    continue;
                }
            }
        }
        pending.push(element);
    }

    for (slot, element) in pending.into_iter().enumerate() {
        match element {
            Value::Tree(incoming_tree) if settings.merge_hash_arrays => {
                if let Some(Value::Tree(existing)) = base.get_mut(slot) {
                    merge(existing, incoming_tree, settings);
                } else {
                    base.push(Value::Tree(incoming_tree));
                }
            }
            other => base.push(other),
        }
    }
}

/// A knockout suffix matches an element by its scalar string form, so
/// `"--1"` removes `1` as well as `"1"`.
fn knockout_matches(element: &Value, target: &str) -> bool {
    match element {
        Value::String(s) => s == target,
        Value::Bool(b) => b.to_string() == target,
        Value::Int(i) => i.to_string() == target,
        Value::Float(f) => f.to_string() == target,
        _ => false,
    }
}
