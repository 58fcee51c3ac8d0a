//! Settings persisted as a TOML file in the project's base directory.
//!
//! ```toml
//! # <base_dir>/.gantry.toml
//! [settings]
//! flutterDir = "flutter"
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use gantry_core::{
    application::{ApplicationError, SettingsBackend, SettingsStore},
    domain::ConfigMap,
    error::{GantryError, GantryResult},
};

pub const SETTINGS_FILE: &str = ".gantry.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: ConfigMap,
}

/// Opens `<base_dir>/.gantry.toml` sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlSettingsBackend;

impl TomlSettingsBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn path_for(base_dir: &Path) -> PathBuf {
        base_dir.join(SETTINGS_FILE)
    }
}

impl SettingsBackend for TomlSettingsBackend {
    #[instrument(skip(self), fields(base_dir = %base_dir.display()))]
    fn open(&self, base_dir: &Path) -> GantryResult<Box<dyn SettingsStore>> {
        let path = Self::path_for(base_dir);
        let values = match fs::read_to_string(&path) {
            Ok(raw) => {
                let file: SettingsFile = toml::from_str(&raw)
                    .map_err(|e| settings_error(&path, format!("invalid TOML: {e}")))?;
                debug!(keys = file.settings.len(), "loaded settings");
                file.settings
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => ConfigMap::new(),
            Err(e) => return Err(settings_error(&path, e.to_string())),
        };

        Ok(Box::new(TomlSession {
            path,
            values,
            dirty: false,
        }))
    }
}

struct TomlSession {
    path: PathBuf,
    values: ConfigMap,
    dirty: bool,
}

impl SettingsStore for TomlSession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.values.get(key).map(String::as_str) != Some(value) {
            self.values.insert(key.to_string(), value.to_string());
            self.dirty = true;
        }
    }

    fn snapshot(&self) -> ConfigMap {
        self.values.clone()
    }

    /// Nothing is written when no value changed.
    fn flush(&mut self) -> GantryResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let file = SettingsFile {
            settings: self.values.clone(),
        };
        let raw = toml::to_string_pretty(&file)
            .map_err(|e| settings_error(&self.path, e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| settings_error(&self.path, e.to_string()))?;
        }
        fs::write(&self.path, raw).map_err(|e| settings_error(&self.path, e.to_string()))?;

        debug!(path = %self.path.display(), keys = self.values.len(), "flushed settings");
        self.dirty = false;
        Ok(())
    }
}

fn settings_error(path: &Path, reason: String) -> GantryError {
    ApplicationError::SettingsError {
        reason: format!("{}: {reason}", path.display()),
    }
    .into()
}
