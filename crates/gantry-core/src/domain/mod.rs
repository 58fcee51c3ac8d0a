// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Gantry.
//!
//! Pure composition logic: phases, unit manifests, the application context
//! and its render snapshots, the composition resolver, the blueprint
//! registry and the write ledger. All I/O (files, settings, prompts,
//! template text) is reached through ports defined in the application
//! layer.
//!
//! - **No I/O**: no filesystem, network or terminal access
//! - **Deterministic**: ordered maps everywhere a result is observable
//! - **Synchronous**: a run is a single thread of control
pub mod entities;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod value_objects;

mod validation;

pub use entities::{
    ApplicationContext, ConfigMap, ConflictPolicy, DestinationConflict, DestinationRule,
    EntityDescriptor, ExecutionPlan, FileSection, RelativePath, RenderContext, RenderedFile,
    TemplateId, UnitManifest, UnitManifestBuilder, WriteLedger, WriteOrigin,
};
pub use error::{DomainError, ErrorCategory};
pub use registry::{BlueprintRegistry, OverriddenBinding, ResolvedRoles, RoleBinding, RoleCandidate};
pub use resolver::CompositionResolver;
pub use validation::DomainValidator;
pub use value_objects::{Phase, PhaseScope, RoleName, UnitName};
