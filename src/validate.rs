//! Post-load validation hook.
//!
//! Validation is a capability, not a framework: anything implementing
//! [`Validator`] can be attached to a registry and runs against the merged
//! tree after every successful load. A non-empty mismatch list fails the
//! load with [`SettingsError::Validation`](crate::SettingsError::Validation).

use serde::Serialize;

use crate::tree::Tree;

/// One validation failure, located by dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub path: String,
    pub message: String,
}

impl Mismatch {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub trait Validator: Send + Sync + std::fmt::Debug {
    /// Checks the merged tree; an empty list means the tree is acceptable.
    fn validate(&self, tree: &Tree) -> Vec<Mismatch>;
}

/// A validator that requires the presence of a fixed set of dotted paths.
#[derive(Debug, Clone, Default)]
pub struct RequiredKeys {
    paths: Vec<String>,
}

impl RequiredKeys {
    pub fn new(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for RequiredKeys {
    fn validate(&self, tree: &Tree) -> Vec<Mismatch> {
        self.paths
            .iter()
            .filter(|path| tree.get_path(path).is_none())
            .map(|path| Mismatch::new(path.clone(), "required key is missing"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(yaml: &str) -> Tree {
        Tree::from_yaml(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_required_keys_pass() {
        let validator = RequiredKeys::new(["database.host", "database.port"]);
        let t = tree("database:\n  host: localhost\n  port: 5432\n");
        assert!(validator.validate(&t).is_empty());
    }

    #[test]
    fn test_required_keys_report_missing_paths() {
        let validator = RequiredKeys::new(["database.host", "database.port"]);
        let t = tree("database:\n  host: localhost\n");
        let mismatches = validator.validate(&t);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].path, "database.port");
    }
}
