//! Application services - orchestrate use cases.
//!
//! `GenerationService` resolves and runs blueprints, `PhaseScheduler`
//! drives one run through the phases, `TemplateService` renders sections.

pub mod generation_service;
pub mod scheduler;
pub mod template_service;

pub use generation_service::{EngineOptions, GenerationService, Resolution};
pub use scheduler::{
    OverriddenRole, PhaseScheduler, RunFailure, RunReport, RunState, WrittenFile,
};
pub use template_service::TemplateService;
