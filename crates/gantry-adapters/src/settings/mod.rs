//! Settings backends.
//!
//! A backend opens one [`SettingsStore`](gantry_core::application::SettingsStore)
//! session per run, scoped to the run's base directory.

mod memory;
mod toml_file;

pub use memory::MemorySettingsBackend;
pub use toml_file::{SETTINGS_FILE, TomlSettingsBackend};
