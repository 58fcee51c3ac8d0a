//! In-memory settings, shared by every session of one backend.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use gantry_core::{
    application::{ApplicationError, SettingsBackend, SettingsStore},
    domain::ConfigMap,
    error::GantryResult,
};

type Shared = Arc<RwLock<BTreeMap<PathBuf, ConfigMap>>>;

/// Settings kept in memory, keyed by base directory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsBackend {
    stored: Shared,
}

impl MemorySettingsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the settings for a base directory.
    pub fn seed(&self, base_dir: impl Into<PathBuf>, settings: ConfigMap) {
        if let Ok(mut stored) = self.stored.write() {
            stored.insert(base_dir.into(), settings);
        }
    }

    /// What the last flush persisted for `base_dir`.
    pub fn stored(&self, base_dir: impl AsRef<Path>) -> ConfigMap {
        self.stored
            .read()
            .ok()
            .and_then(|s| s.get(base_dir.as_ref()).cloned())
            .unwrap_or_default()
    }
}

impl SettingsBackend for MemorySettingsBackend {
    fn open(&self, base_dir: &Path) -> GantryResult<Box<dyn SettingsStore>> {
        let stored = self
            .stored
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(Box::new(MemorySession {
            base_dir: base_dir.to_path_buf(),
            values: stored.get(base_dir).cloned().unwrap_or_default(),
            target: Arc::clone(&self.stored),
        }))
    }
}

struct MemorySession {
    base_dir: PathBuf,
    values: ConfigMap,
    target: Shared,
}

impl SettingsStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn snapshot(&self) -> ConfigMap {
        self.values.clone()
    }

    fn flush(&mut self) -> GantryResult<()> {
        let mut target = self
            .target
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        target.insert(self.base_dir.clone(), self.values.clone());
        Ok(())
    }
}
