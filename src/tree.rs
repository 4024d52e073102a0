//! The ordered, nested settings container.

use indexmap::IndexMap;

use crate::error::SettingsError;
use crate::merge::{merge, MergeSettings};
use crate::value::{yaml_key_string, Value};

/// An ordered mapping from keys to [`Value`]s, the unit of layered settings.
///
/// Keys are unique and insertion order is preserved: [`Tree::iter`] yields
/// entries in the order they were first inserted. Indexed access with a
/// missing key yields [`Value::Nil`]; use [`Tree::fetch`] when an absent key
/// should be an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    entries: IndexMap<String, Value>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a parsed YAML document. Non-mapping documents (including the
    /// empty document) normalize to an empty tree.
    pub fn from_yaml(doc: serde_yaml::Value) -> Self {
        match Value::from(doc) {
            Value::Tree(tree) => tree,
            _ => Tree::new(),
        }
    }

    /// Wraps a JSON value; non-object values normalize to an empty tree.
    pub fn from_json(doc: serde_json::Value) -> Self {
        match Value::from(doc) {
            Value::Tree(tree) => tree,
            _ => Tree::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Resolves a dotted path (`"section.servers"`) through nested trees.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.get(first)?;
        for segment in segments {
            current = current.as_tree()?.get(segment)?;
        }
        Some(current)
    }

    /// Like [`Tree::get`] but errors with [`SettingsError::KeyNotFound`] when
    /// the key is absent.
    pub fn fetch(&self, key: &str) -> Result<&Value, SettingsError> {
        self.entries
            .get(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.to_string()))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produces an independent plain JSON copy of the whole tree.
    ///
    /// Nested trees stay trees in `self`; the projection never mutates or
    /// unwraps any descendant.
    pub fn to_plain(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_plain()))
                .collect(),
        )
    }

    pub fn to_json(&self) -> String {
        self.to_plain().to_string()
    }

    /// Merges `incoming` into `self` under the given settings and returns
    /// `self` for chaining.
    pub fn merge_from(&mut self, incoming: Tree, settings: &MergeSettings) -> &mut Self {
        merge(self, incoming, settings);
        self
    }
}

impl std::ops::Index<&str> for Tree {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        static NIL: Value = Value::Nil;
        self.entries.get(key).unwrap_or(&NIL)
    }
}

impl FromIterator<(String, Value)> for Tree {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Tree {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Tree {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<serde_yaml::Mapping> for Tree {
    fn from(map: serde_yaml::Mapping) -> Self {
        let mut tree = Tree::new();
        for (key, value) in map {
            tree.insert(yaml_key_string(&key), Value::from(value));
        }
        tree
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Tree {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut tree = Tree::new();
        for (key, value) in map {
            tree.insert(key, Value::from(value));
        }
        tree
    }
}
