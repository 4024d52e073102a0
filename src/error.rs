use std::path::PathBuf;

use thiserror::Error;

use crate::validate::Mismatch;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error(
        "environment variable '{conflicting}' conflicts with '{existing}': \
         a key cannot be both a value and a namespace"
    )]
    EnvConflict {
        existing: String,
        conflicting: String,
    },

    #[error("settings key not found: {0}")]
    KeyNotFound(String),

    #[error("settings validation failed with {} mismatch(es)", .0.len())]
    Validation(Vec<Mismatch>),
}
