//! Settings sources.
//!
//! Anything that can produce a raw settings layer implements [`Source`]; the
//! registry folds each layer into the accumulator in order. Absent or empty
//! underlying data yields an empty tree, never an error.

use crate::env::{ingest, EnvSettings};
use crate::error::SettingsError;
use crate::tree::Tree;

pub trait Source: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Result<Tree, SettingsError>;
}

/// A literal in-memory layer, for programmatic injection (tests, secret
/// managers, generated defaults).
#[derive(Debug, Clone, Default)]
pub struct HashSource {
    tree: Tree,
}

impl HashSource {
    pub fn new(tree: impl Into<Tree>) -> Self {
        Self { tree: tree.into() }
    }
}

impl Source for HashSource {
    fn load(&self) -> Result<Tree, SettingsError> {
        Ok(self.tree.clone())
    }
}

/// A layer built from a flat variable mapping via the env ingestor.
#[derive(Debug, Clone)]
pub struct EnvSource {
    vars: Vec<(String, String)>,
    settings: EnvSettings,
}

impl EnvSource {
    pub fn new(vars: Vec<(String, String)>, settings: EnvSettings) -> Self {
        Self { vars, settings }
    }

    /// Captures the current process environment.
    pub fn from_process(settings: EnvSettings) -> Self {
        Self {
            vars: std::env::vars().collect(),
            settings,
        }
    }
}

impl Source for EnvSource {
    fn load(&self) -> Result<Tree, SettingsError> {
        ingest(&self.vars, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_hash_source_returns_its_tree() {
        let mut tree = Tree::new();
        tree.insert("a", 1i64);
        let source = HashSource::new(tree.clone());
        assert_eq!(source.load().unwrap(), tree);
        // repeated loads are independent copies
        assert_eq!(source.load().unwrap(), tree);
    }

    #[test]
    fn test_env_source_delegates_to_ingestor() {
        let source = EnvSource::new(
            vec![("SETTINGS.PORT".into(), "8080".into())],
            EnvSettings::default(),
        );
        let tree = source.load().unwrap();
        assert_eq!(tree["port"], Value::Int(8080));
    }

    #[test]
    fn test_empty_env_source_loads_empty_tree() {
        let source = EnvSource::new(Vec::new(), EnvSettings::default());
        assert!(source.load().unwrap().is_empty());
    }
}
