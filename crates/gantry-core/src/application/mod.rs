//! Application layer for Gantry.
//!
//! This layer contains:
//! - **Units & blueprints**: generator units (tasks + sections) and the
//!   named role compositions that run them
//! - **Services**: generation, phase scheduling, section rendering
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! Ordering and conflict rules live in `crate::domain`; this layer drives
//! them and does the I/O through ports.

pub mod blueprint;
pub mod error;
pub mod ports;
pub mod services;
pub mod task;
pub mod unit;

#[cfg(test)]
pub(crate) mod testing;

pub use blueprint::{Blueprint, BlueprintCatalog, BlueprintInfo};
pub use error::ApplicationError;
pub use ports::{
    Filesystem, Prompter, Question, SettingsBackend, SettingsStore, TemplateRenderer,
    TemplateStore, WriteOutcome,
};
pub use services::{
    EngineOptions, GenerationService, OverriddenRole, PhaseScheduler, Resolution, RunFailure,
    RunReport, RunState, TemplateService, WrittenFile,
};
pub use task::TaskContext;
pub use unit::{GeneratorUnit, GeneratorUnitBuilder, Task};
