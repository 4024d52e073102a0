//! Source orchestration and the shared settings object.
//!
//! A [`Registry`] remembers an ordered source list plus merge/env settings,
//! folds the sources into one tree, and exposes the result through cheaply
//! clonable [`Settings`] handles. Reloading replaces the tree's contents in
//! place behind a lock, so every existing handle observes the update.
//!
//! A process-wide default registry is available through [`global`]; it is a
//! convenience layer only — construct isolated `Registry` instances in tests
//! and libraries.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::env::EnvSettings;
use crate::error::SettingsError;
use crate::file::FileSource;
use crate::merge::{merge, MergeSettings};
use crate::paths::setting_files;
use crate::source::{EnvSource, Source};
use crate::tree::Tree;
use crate::validate::{Mismatch, Validator};
use crate::value::Value;

/// Folds sources left-to-right into one tree; the last source wins ties.
///
/// Always yields a valid (possibly empty) tree, even when every source is
/// missing or empty.
pub fn load_sources<'a>(
    sources: impl IntoIterator<Item = &'a dyn Source>,
    settings: &MergeSettings,
) -> Result<Tree, SettingsError> {
    let mut accumulator = Tree::new();
    for source in sources {
        let layer = source.load()?;
        debug!(source = ?source, keys = layer.len(), "merging settings layer");
        merge(&mut accumulator, layer, settings);
    }
    Ok(accumulator)
}

/// Convenience wrapper over [`load_sources`] for plain file paths.
pub fn load_files(
    paths: impl IntoIterator<Item = impl Into<PathBuf>>,
    settings: &MergeSettings,
) -> Result<Tree, SettingsError> {
    let sources: Vec<FileSource> = paths.into_iter().map(|p| FileSource::new(p.into())).collect();
    load_sources(sources.iter().map(|s| s as &dyn Source), settings)
}

/// Ordered sources, policies, and the shared settings tree.
#[derive(Debug)]
pub struct Registry {
    name: String,
    sources: Vec<Box<dyn Source>>,
    merge_settings: MergeSettings,
    env_settings: EnvSettings,
    fail_on_missing: bool,
    validators: Vec<Box<dyn Validator>>,
    tree: Arc<RwLock<Tree>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_name("Settings")
    }

    /// Creates a registry bound to `name`; the uppercased name doubles as the
    /// default environment-variable prefix.
    pub fn with_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let env_settings = EnvSettings {
            prefix: name.to_uppercase(),
            ..EnvSettings::default()
        };
        Self {
            name,
            sources: Vec::new(),
            merge_settings: MergeSettings::default(),
            env_settings,
            fail_on_missing: false,
            validators: Vec::new(),
            tree: Arc::new(RwLock::new(Tree::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn merge_settings(&self) -> &MergeSettings {
        &self.merge_settings
    }

    /// Merge settings are consulted on every load; set them before the first.
    pub fn merge_settings_mut(&mut self) -> &mut MergeSettings {
        &mut self.merge_settings
    }

    pub fn env_settings(&self) -> &EnvSettings {
        &self.env_settings
    }

    pub fn env_settings_mut(&mut self) -> &mut EnvSettings {
        &mut self.env_settings
    }

    /// When enabled, handle reads of absent keys error instead of yielding nil.
    pub fn set_fail_on_missing(&mut self, fail: bool) {
        self.fail_on_missing = fail;
    }

    pub fn add_validator(&mut self, validator: impl Validator + 'static) {
        self.validators.push(Box::new(validator));
    }

    /// Returns a handle onto the shared tree. Handles are cheap clones and
    /// observe every subsequent reload.
    pub fn settings(&self) -> Settings {
        Settings {
            tree: Arc::clone(&self.tree),
            fail_on_missing: self.fail_on_missing,
        }
    }

    /// Replaces the remembered sources, loads them, and binds the result.
    pub fn load_and_set(
        &mut self,
        sources: Vec<Box<dyn Source>>,
    ) -> Result<Settings, SettingsError> {
        self.sources = sources;
        self.reload()?;
        Ok(self.settings())
    }

    /// Appends a source; the tree is not rebuilt until [`Registry::reload`].
    pub fn add_source(&mut self, source: impl Source + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Prepends a source (lowest precedence); no rebuild until reload.
    pub fn prepend_source(&mut self, source: impl Source + 'static) {
        self.sources.insert(0, Box::new(source));
    }

    /// Re-runs the fold over the remembered sources and swaps the result into
    /// the shared tree under the write lock. The merge happens outside the
    /// lock, so readers never observe a half-merged tree.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let rebuilt = self.rebuild()?;
        let mut guard = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        *guard = rebuilt;
        debug!(name = %self.name, "settings reloaded");
        Ok(())
    }

    /// Replaces the remembered sources with the given files, then reloads.
    pub fn reload_from_files(
        &mut self,
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Result<(), SettingsError> {
        self.sources = paths
            .into_iter()
            .map(|p| Box::new(FileSource::new(p.into())) as Box<dyn Source>)
            .collect();
        self.reload()
    }

    /// Loads the canonical settings file set for `environment` under `root`.
    pub fn load_settings_files(
        &mut self,
        root: impl AsRef<std::path::Path>,
        environment: &str,
    ) -> Result<Settings, SettingsError> {
        self.reload_from_files(setting_files(root, environment))?;
        Ok(self.settings())
    }

    fn rebuild(&self) -> Result<Tree, SettingsError> {
        let mut tree = load_sources(
            self.sources.iter().map(|s| s.as_ref()),
            &self.merge_settings,
        )?;

        if self.env_settings.use_env {
            let layer = EnvSource::from_process(self.env_settings.clone()).load()?;
            merge(&mut tree, layer, &self.merge_settings);
        }

        let mismatches: Vec<Mismatch> = self
            .validators
            .iter()
            .flat_map(|v| v.validate(&tree))
            .collect();
        if !mismatches.is_empty() {
            return Err(SettingsError::Validation(mismatches));
        }

        Ok(tree)
    }
}

/// A read handle onto a registry's shared settings tree.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    tree: Arc<RwLock<Tree>>,
    fail_on_missing: bool,
}

impl Settings {
    fn guard(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.guard().get(key).cloned()
    }

    pub fn get_path(&self, path: &str) -> Option<Value> {
        self.guard().get_path(path).cloned()
    }

    /// Reads a key under the registry's missing-key policy: nil for absent
    /// keys by default, [`SettingsError::KeyNotFound`] under `fail_on_missing`.
    pub fn read(&self, key: &str) -> Result<Value, SettingsError> {
        match self.get(key) {
            Some(value) => Ok(value),
            None if self.fail_on_missing => Err(SettingsError::KeyNotFound(key.to_string())),
            None => Ok(Value::Nil),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.guard().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.guard().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn to_plain(&self) -> serde_json::Value {
        self.guard().to_plain()
    }

    pub fn to_json(&self) -> String {
        self.guard().to_json()
    }

    /// Clones the current tree contents.
    pub fn snapshot(&self) -> Tree {
        self.guard().clone()
    }

    /// Merges a layer directly into the shared tree.
    pub fn merge_from(&self, incoming: Tree, settings: &MergeSettings) -> &Self {
        let mut guard = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        merge(&mut guard, incoming, settings);
        self
    }
}

static GLOBAL: Lazy<Mutex<Registry>> = Lazy::new(|| Mutex::new(Registry::new()));

/// The process-wide default registry.
pub fn global() -> &'static Mutex<Registry> {
    &GLOBAL
}

/// Resets the default registry to a pristine state (test isolation).
pub fn reset_global() {
    let mut guard = GLOBAL.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = Registry::new();
}
