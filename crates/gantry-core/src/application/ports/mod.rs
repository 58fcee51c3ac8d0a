//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `gantry-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by a run, implemented by infrastructure
//!   - `Filesystem`: file writes and reads
//!   - `SettingsBackend` / `SettingsStore`: persisted per-project settings
//!   - `TemplateStore`: template text lookup
//!   - `TemplateRenderer`: placeholder substitution
//!   - `Prompter`: input collection during the prompting phase

pub mod output;

pub use output::{
    Filesystem, Prompter, Question, SettingsBackend, SettingsStore, TemplateRenderer,
    TemplateStore, WriteOutcome,
};

#[cfg(test)]
pub use output::MockFilesystem;
