//! Gantry Core - Hexagonal Architecture Implementation
//!
//! Domain and application layers of the Gantry project generator: generator
//! units are composed by role, ordered by dependency and priority, and driven
//! through a fixed sequence of lifecycle phases that render files into a
//! target tree.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            gantry-cli (CLI)             │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │  GenerationService ─▶ PhaseScheduler    │
//! │           TemplateService               │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │  Filesystem, SettingsBackend, Prompter, │
//! │  TemplateStore, TemplateRenderer        │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     gantry-adapters (Infrastructure)    │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  CompositionResolver, BlueprintRegistry │
//! │  ApplicationContext, WriteLedger        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gantry_core::prelude::*;
//!
//! let unit = GeneratorUnit::builder(UnitManifest::builder("readme").build()?)
//!     .section(Phase::Writing, FileSection::to("readme", "README.md"))
//!     .build()?;
//! let blueprint = Blueprint::new("docs", "Just a README").with_unit(unit);
//!
//! let report = service.run_blueprint(&blueprint, ApplicationContext::new("demo", "out"));
//! report.into_result()?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Blueprint, BlueprintCatalog, BlueprintInfo, EngineOptions, GenerationService,
        GeneratorUnit, Question, Resolution, RunReport, RunState, TaskContext, TemplateService,
        WriteOutcome,
        ports::{
            Filesystem, Prompter, SettingsBackend, SettingsStore, TemplateRenderer, TemplateStore,
        },
    };
    pub use crate::domain::{
        ApplicationContext, ConfigMap, DestinationRule, EntityDescriptor, ExecutionPlan,
        FileSection, Phase, RelativePath, RenderContext, RoleName, TemplateId, UnitManifest,
        UnitName,
    };
    pub use crate::error::{GantryError, GantryResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
