//! Infrastructure adapters for Gantry.
//!
//! This crate implements the ports defined in `gantry-core::application::ports`
//! and ships the declarative blueprint loader plus the built-in blueprints.
//! It contains all external dependencies and I/O operations.

pub mod blueprint_loader;
pub mod builtin_blueprints;
pub mod filesystem;
pub mod prompter;
pub mod renderer;
pub mod settings;
pub mod tasks;
pub mod template_store;

// Re-export commonly used adapters
pub use blueprint_loader::{BlueprintLoader, LoadError, LoadedBlueprints};
pub use builtin_blueprints::{builtin_catalog, builtin_templates, default_search_path};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use prompter::{DefaultsPrompter, PresetPrompter};
pub use renderer::SimpleRenderer;
pub use settings::{MemorySettingsBackend, TomlSettingsBackend};
pub use template_store::{DirectoryTemplates, InMemoryTemplates, LayeredTemplates};
