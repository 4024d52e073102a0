//! The settings value model.
//!
//! A [`Value`] is a scalar, an array, or a nested [`Tree`]. Raw parser output
//! (`serde_yaml` / `serde_json` values) converts losslessly into this model,
//! with every mapping — including mappings inside sequences — wrapped into a
//! `Tree`.

use crate::tree::Tree;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Tree(Tree),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Value::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Projects this value onto a plain `serde_json::Value`.
    ///
    /// The result is an independent deep copy; `self` is never mutated.
    pub fn to_plain(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => (*b).into(),
            Value::Int(i) => (*i).into(),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_plain).collect())
            }
            Value::Tree(tree) => tree.to_plain(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        Value::Tree(tree)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Nil,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Nil
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(seq) => {
                Value::Array(seq.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(map) => Value::Tree(Tree::from(map)),
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Nil
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Tree(Tree::from(map)),
        }
    }
}

/// Normalizes an arbitrary YAML mapping key to its scalar string form.
pub(crate) fn yaml_key_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => String::from("~"),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_yaml(s: &str) -> Value {
        Value::from(serde_yaml::from_str::<serde_yaml::Value>(s).unwrap())
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(from_yaml("42"), Value::Int(42));
        assert_eq!(from_yaml("4.5"), Value::Float(4.5));
        assert_eq!(from_yaml("true"), Value::Bool(true));
        assert_eq!(from_yaml("~"), Value::Nil);
        assert_eq!(from_yaml("hello"), Value::String("hello".into()));
    }

    #[test]
    fn test_mappings_inside_sequences_become_trees() {
        let value = from_yaml("- name: yahoo.com\n- name: amazon.com\n");
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        let first = items[0].as_tree().unwrap();
        assert_eq!(first.get("name"), Some(&Value::String("yahoo.com".into())));
    }

    #[test]
    fn test_non_string_keys_normalized() {
        let value = from_yaml("1: one\ntrue: yes_key\n");
        let tree = value.as_tree().unwrap();
        assert_eq!(tree.get("1"), Some(&Value::String("one".into())));
        assert_eq!(tree.get("true"), Some(&Value::String("yes_key".into())));
    }

    #[test]
    fn test_to_plain_round_trip() {
        let value = from_yaml("a: 1\nb: [x, y]\nc:\n  d: true\n");
        let plain = value.to_plain();
        assert_eq!(plain["a"], serde_json::json!(1));
        assert_eq!(plain["b"], serde_json::json!(["x", "y"]));
        assert_eq!(plain["c"]["d"], serde_json::json!(true));
    }
}
