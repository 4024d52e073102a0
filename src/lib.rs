//! Layered hierarchical application settings.

pub mod env;
mod error;
pub mod file;
pub mod merge;
pub mod paths;
pub mod registry;
pub mod source;
pub mod tree;
pub mod validate;
pub mod value;

pub use env::{coerce_value, ingest, EnvSettings, KeyConverter};
pub use error::SettingsError;
pub use file::FileSource;
pub use merge::{merge, MergeSettings};
pub use paths::setting_files;
pub use registry::{global, load_files, load_sources, reset_global, Registry, Settings};
pub use source::{EnvSource, HashSource, Source};
pub use tree::Tree;
pub use validate::{Mismatch, RequiredKeys, Validator};
pub use value::Value;
