//! Environment-variable ingestion.
//!
//! Rebuilds a nested settings tree from a flat string namespace: keys are
//! filtered by prefix, split on a separator into a path, and assigned after
//! optional type coercion. A key that would have to be both a leaf value and
//! a namespace is a hard error naming both offending variables.

use std::collections::HashMap;

use crate::error::SettingsError;
use crate::tree::Tree;
use crate::value::Value;

/// Per-segment key transformation applied after splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyConverter {
    Identity,
    #[default]
    Lowercase,
}

impl KeyConverter {
    fn apply(self, segment: &str) -> String {
        match self {
            KeyConverter::Identity => segment.to_string(),
            KeyConverter::Lowercase => segment.to_lowercase(),
        }
    }
}

/// Settings for the ingestion algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvSettings {
    /// Whether the registry appends a process-environment layer on load.
    pub use_env: bool,
    /// Case-sensitive variable-name prefix; only `{prefix}{separator}...`
    /// variables are ingested.
    pub prefix: String,
    pub separator: String,
    pub converter: KeyConverter,
    /// Coerce values to bool/int/float where they parse as such.
    pub parse_values: bool,
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            use_env: false,
            prefix: "SETTINGS".into(),
            separator: ".".into(),
            converter: KeyConverter::default(),
            parse_values: true,
        }
    }
}

/// Converts a flat variable mapping into a nested tree.
///
/// Variables are processed in sorted name order so conflict reporting is
/// deterministic regardless of input order.
pub fn ingest(vars: &[(String, String)], settings: &EnvSettings) -> Result<Tree, SettingsError> {
    let prefix = format!("{}{}", settings.prefix, settings.separator);

    let mut matched: Vec<(&str, Vec<String>, &str)> = Vec::new();
    for (name, value) in vars {
        let Some(rest) = name.strip_prefix(&prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let segments: Vec<String> = rest
            .split(settings.separator.as_str())
            .map(|s| settings.converter.apply(s))
            .collect();
        if segments.iter().any(String::is_empty) {
            continue;
        }
        matched.push((name.as_str(), segments, value.as_str()));
    }
    matched.sort_by(|a, b| a.0.cmp(b.0));

    let mut root = Tree::new();
    let mut origins: HashMap<Vec<String>, String> = HashMap::new();
    let mut path = Vec::new();
    for (name, segments, raw) in matched {
        let value = if settings.parse_values {
            coerce_value(raw)
        } else {
            Value::String(raw.to_string())
        };
        assign(&mut root, &segments, value, name, &mut path, &mut origins)?;
    }
    Ok(root)
}

fn assign(
    node: &mut Tree,
    segments: &[String],
    value: Value,
    var: &str,
    path: &mut Vec<String>,
    origins: &mut HashMap<Vec<String>, String>,
) -> Result<(), SettingsError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };
    path.push(head.clone());

    if rest.is_empty() {
        // An existing namespace at this path cannot collapse into a leaf.
        if matches!(node.get(head), Some(Value::Tree(_))) {
            return Err(conflict(origins, path, var));
        }
        node.insert(head.clone(), value);
        origins.insert(path.clone(), var.to_string());
    } else {
        match node.get(head) {
            Some(Value::Tree(_)) => {}
            // An existing leaf cannot be traversed as a namespace.
            Some(_) => return Err(conflict(origins, path, var)),
            None => {
                node.insert(head.clone(), Value::Tree(Tree::new()));
                origins.insert(path.clone(), var.to_string());
            }
        }
        if let Some(Value::Tree(child)) = node.get_mut(head) {
            assign(child, rest, value, var, path, origins)?;
        }
    }

    path.pop();
    Ok(())
}

fn conflict(origins: &HashMap<Vec<String>, String>, path: &[String], var: &str) -> SettingsError {
    SettingsError::EnvConflict {
        existing: origins
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.join(".")),
        conflicting: var.to_string(),
    }
}

/// Coerces a raw string to the most specific value type, trying boolean,
/// integer, then float, and falling back to the string unchanged. Arrays are
/// never synthesized from environment values.
pub fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Int(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn settings(prefix: &str, separator: &str) -> EnvSettings {
        EnvSettings {
            prefix: prefix.into(),
            separator: separator.into(),
            ..EnvSettings::default()
        }
    }

    #[test]
    fn test_nested_ingestion_with_coercion() {
        let tree = ingest(
            &vars(&[("SETTINGS__SECTION__SIZE", "1")]),
            &settings("SETTINGS", "__"),
        )
        .unwrap();
        assert_eq!(tree.get_path("section.size"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_prefix_filter_is_case_sensitive() {
        let tree = ingest(
            &vars(&[("settings__a", "1"), ("OTHER__B", "2"), ("SETTINGS", "3")]),
            &settings("SETTINGS", "__"),
        )
        .unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_leaf_then_namespace_conflicts() {
        let err = ingest(
            &vars(&[
                ("BACKEND_DATABASE", "development"),
                ("BACKEND_DATABASE_USER", "postgres"),
            ]),
            &settings("BACKEND", "_"),
        )
        .unwrap_err();
        match err {
            SettingsError::EnvConflict {
                existing,
                conflicting,
            } => {
                assert_eq!(existing, "BACKEND_DATABASE");
                assert_eq!(conflicting, "BACKEND_DATABASE_USER");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conflict_detected_regardless_of_input_order() {
        let err = ingest(
            &vars(&[
                ("BACKEND_DATABASE_USER", "postgres"),
                ("BACKEND_DATABASE", "development"),
            ]),
            &settings("BACKEND", "_"),
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::EnvConflict { .. }));
    }

    #[test]
    fn test_namespace_then_leaf_conflicts() {
        // Lowercasing collapses DB and db onto the same path; the namespace
        // is built first (sorted order), then the flat value collides.
        let err = ingest(
            &vars(&[("APP.DB.HOST", "localhost"), ("APP.db", "flat")]),
            &settings("APP", "."),
        )
        .unwrap_err();
        match err {
            SettingsError::EnvConflict {
                existing,
                conflicting,
            } => {
                assert_eq!(existing, "APP.DB.HOST");
                assert_eq!(conflicting, "APP.db");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_identity_converter_preserves_case() {
        let env = EnvSettings {
            converter: KeyConverter::Identity,
            ..settings("APP", "__")
        };
        let tree = ingest(&vars(&[("APP__Section__Key", "v")]), &env).unwrap();
        assert_eq!(
            tree.get_path("Section.Key"),
            Some(&Value::String("v".into()))
        );
    }

    #[test]
    fn test_parse_values_disabled_keeps_strings() {
        let env = EnvSettings {
            parse_values: false,
            ..settings("APP", "__")
        };
        let tree = ingest(&vars(&[("APP__PORT", "5432")]), &env).unwrap();
        assert_eq!(tree["port"], Value::String("5432".into()));
    }

    #[test]
    fn test_coercion_order() {
        assert_eq!(coerce_value("true"), Value::Bool(true));
        assert_eq!(coerce_value("FALSE"), Value::Bool(false));
        assert_eq!(coerce_value("42"), Value::Int(42));
        assert_eq!(coerce_value("-7"), Value::Int(-7));
        assert_eq!(coerce_value("3.25"), Value::Float(3.25));
        assert_eq!(coerce_value("1.2.3"), Value::String("1.2.3".into()));
        assert_eq!(coerce_value("hello"), Value::String("hello".into()));
    }
}
