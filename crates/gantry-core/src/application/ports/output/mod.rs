//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what a run needs from the outside world. The
//! `gantry-adapters` crate provides implementations; the CLI adds a terminal
//! prompter.

use std::path::Path;

use crate::domain::{ConfigMap, RenderContext, TemplateId};
use crate::error::GantryResult;

// ============================================================================
// Filesystem
// ============================================================================

/// Result of a single file write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
    /// Existing content was identical; nothing was touched.
    Unchanged,
}

impl WriteOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `gantry_adapters::filesystem::LocalFilesystem` (production)
/// - `gantry_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Writes overwrite unconditionally (no merge) and create parent
/// directories as needed.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> GantryResult<()>;

    /// Write content to a file, skipping the write if it is unchanged.
    fn write_file(&self, path: &Path, content: &str) -> GantryResult<WriteOutcome>;

    /// Read a file, `None` if it does not exist.
    fn read_file(&self, path: &Path) -> GantryResult<Option<String>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

// ============================================================================
// Settings
// ============================================================================

/// One open settings session, scoped to a base directory.
///
/// Opened after resolution succeeds and flushed when the run ends, whether
/// it completed or aborted.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    /// All settings, ordered by key.
    fn snapshot(&self) -> ConfigMap;

    /// Persist pending changes.
    fn flush(&mut self) -> GantryResult<()>;

    /// Write only the keys that are currently absent. Returns the keys that
    /// were written.
    fn apply_defaults(&mut self, defaults: &ConfigMap) -> Vec<String> {
        let mut written = Vec::new();
        for (key, value) in defaults {
            if self.get(key).is_none() {
                self.set(key, value);
                written.push(key.clone());
            }
        }
        written
    }
}

/// Opens settings sessions.
///
/// Implemented by:
/// - `gantry_adapters::settings::MemorySettingsBackend` (testing)
/// - `gantry_adapters::settings::TomlSettingsBackend` (`<base_dir>/.gantry.toml`)
pub trait SettingsBackend: Send + Sync {
    fn open(&self, base_dir: &Path) -> GantryResult<Box<dyn SettingsStore>>;
}

// ============================================================================
// Templates
// ============================================================================

/// Port for template text lookup.
pub trait TemplateStore: Send + Sync {
    /// Get template text by id.
    fn get(&self, id: &TemplateId) -> GantryResult<String>;

    /// List all available template ids, sorted.
    fn list(&self) -> GantryResult<Vec<TemplateId>>;

    fn contains(&self, id: &TemplateId) -> bool {
        self.get(id).is_ok()
    }
}

/// Port for placeholder substitution.
///
/// Implemented by:
/// - `gantry_adapters::renderer::SimpleRenderer` (`{{VARIABLE}}` substitution)
pub trait TemplateRenderer: Send + Sync {
    /// Render template text. `id` is only used for error reporting.
    fn render(&self, id: &TemplateId, template: &str, ctx: &RenderContext) -> GantryResult<String>;
}

// ============================================================================
// Input collection
// ============================================================================

/// A single question asked during the prompting phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Context/settings key the answer is meant for.
    pub key: String,
    pub message: String,
    pub default: Option<String>,
}

impl Question {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Port for input collection. Returns answers; never touches the context.
pub trait Prompter: Send + Sync {
    fn prompt(&self, question: &Question) -> GantryResult<String>;
}
