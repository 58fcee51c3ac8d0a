pub mod common;
pub mod context;
pub mod ledger;
pub mod plan;
pub mod section;
pub mod unit;

pub use crate::domain::DomainError;
pub use common::RelativePath;
pub use context::{ApplicationContext, ConfigMap, EntityDescriptor, RenderContext};
pub use ledger::{ConflictPolicy, DestinationConflict, WriteLedger, WriteOrigin};
pub use plan::ExecutionPlan;
pub use section::{DestinationRule, FileSection, RenderedFile, TemplateId};
pub use unit::{UnitManifest, UnitManifestBuilder};
