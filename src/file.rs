//! File-backed settings source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::SettingsError;
use crate::source::Source;
use crate::tree::Tree;

type Expander = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A settings source that loads a YAML file.
///
/// Missing files are not errors: they load as an empty tree, so a standard
/// candidate list (`settings.yml`, `settings/production.yml`, ...) can be fed
/// to the loader without checking which files exist. An optional expander
/// hook transforms the raw text (e.g. template evaluation) before parsing.
#[derive(Clone)]
pub struct FileSource {
    path: PathBuf,
    expander: Option<Expander>,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            expander: None,
        }
    }

    /// Attaches a text expander applied to the file contents before parsing.
    pub fn with_expander(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.expander = Some(Arc::new(f));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("path", &self.path)
            .field("expander", &self.expander.is_some())
            .finish()
    }
}

impl Source for FileSource {
    fn load(&self) -> Result<Tree, SettingsError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file not found, skipping");
                return Ok(Tree::new());
            }
            Err(e) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let text = match &self.expander {
            Some(expand) => expand(&text),
            None => text,
        };
        if text.trim().is_empty() {
            return Ok(Tree::new());
        }

        let doc: serde_yaml::Value =
            serde_yaml::from_str(&text).map_err(|e| SettingsError::Parse {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(Tree::from_yaml(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_loads_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "size: 1\nserver: google.com").unwrap();

        let tree = FileSource::new(file.path()).load().unwrap();
        assert_eq!(tree["size"], Value::Int(1));
        assert_eq!(tree["server"], Value::String("google.com".into()));
    }

    #[test]
    fn test_missing_file_loads_empty_tree() {
        let tree = FileSource::new("/nonexistent/path/settings.yml")
            .load()
            .unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_empty_file_loads_empty_tree() {
        let file = NamedTempFile::new().unwrap();
        let tree = FileSource::new(file.path()).load().unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_parse_error_carries_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key: [unclosed").unwrap();

        let err = FileSource::new(file.path()).load().unwrap_err();
        match err {
            SettingsError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_expander_runs_before_parsing() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "value: @PLACEHOLDER@").unwrap();

        let tree = FileSource::new(file.path())
            .with_expander(|text| text.replace("@PLACEHOLDER@", "42"))
            .load()
            .unwrap();
        assert_eq!(tree["value"], Value::Int(42));
    }
}
