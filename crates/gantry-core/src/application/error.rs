//! Application layer errors.
//!
//! These errors represent failures in orchestration and at the ports, not
//! composition rules. Those are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Phase;
use crate::error::{ErrorCategory, GantryError};

/// Errors that occur during a run.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A unit's task failed; the run was aborted in `phase`.
    #[error("task '{task}' of unit '{unit}' failed during {phase}: {source}")]
    PhaseCallback {
        unit: String,
        phase: Phase,
        task: String,
        source: Box<GantryError>,
    },

    /// A task signalled failure on its own.
    #[error("{reason}")]
    TaskFailed { reason: String },

    /// Template rendering failed.
    #[error("rendering template '{template}' failed: {reason}")]
    RenderingFailed { template: String, reason: String },

    #[error("template '{template}' not found")]
    TemplateNotFound { template: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Settings store failure (unreadable file, failed flush).
    #[error("settings error: {reason}")]
    SettingsError { reason: String },

    /// Input collection failed.
    #[error("prompt for '{key}' failed: {reason}")]
    PromptFailed { key: String, reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Template store error")]
    StoreLockError,

    #[error("dynamic composition exceeded {limit} additional pass(es)")]
    CompositionDepthExceeded { limit: usize },

    #[error("nested runs exceeded the maximum depth of {limit}")]
    NestingDepthExceeded { limit: usize },

    #[error("prompting is only allowed during the prompting phase (current: {phase})")]
    PromptOutsidePrompting { phase: Phase },

    #[error("units can only be composed during the composing phase (current: {phase})")]
    ComposeOutsideComposing { phase: Phase },

    #[error("files can only be written during the writing phases (current: {phase})")]
    WriteOutsideWritingPhase { phase: Phase },

    #[error("unknown blueprint '{0}'")]
    UnknownBlueprint(String),

    /// A declarative blueprint could not be loaded.
    #[error("invalid blueprint at {path}: {reason}")]
    BlueprintInvalid { path: PathBuf, reason: String },
}

impl ApplicationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PhaseCallback { .. } => "PhaseCallback",
            Self::TaskFailed { .. } => "TaskFailed",
            Self::RenderingFailed { .. } => "RenderingFailed",
            Self::TemplateNotFound { .. } => "TemplateNotFound",
            Self::FilesystemError { .. } => "FilesystemError",
            Self::SettingsError { .. } => "SettingsError",
            Self::PromptFailed { .. } => "PromptFailed",
            Self::StoreLockError => "StoreLockError",
            Self::CompositionDepthExceeded { .. } => "CompositionDepthExceeded",
            Self::NestingDepthExceeded { .. } => "NestingDepthExceeded",
            Self::PromptOutsidePrompting { .. } => "PromptOutsidePrompting",
            Self::ComposeOutsideComposing { .. } => "ComposeOutsideComposing",
            Self::WriteOutsideWritingPhase { .. } => "WriteOutsideWritingPhase",
            Self::UnknownBlueprint(_) => "UnknownBlueprint",
            Self::BlueprintInvalid { .. } => "BlueprintInvalid",
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::PhaseCallback {
                unit,
                phase,
                source,
                ..
            } => {
                let mut out = vec![format!(
                    "Unit '{}' aborted the run during {}; files from earlier phases remain on disk",
                    unit, phase
                )];
                out.extend(source.suggestions());
                out.push("Fix the cause and re-run; re-running is safe".into());
                out
            }
            Self::TemplateNotFound { template } => vec![
                format!("No template named '{}' in the template store", template),
                "Check the blueprint's template directory".into(),
            ],
            Self::RenderingFailed { .. } => vec![
                "Provide the missing variable with --set KEY=VALUE".into(),
                "Or disable strict templates (engine.strict_templates = false)".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::SettingsError { .. } => vec![
                "Check the .gantry.toml file in the output directory".into(),
            ],
            Self::StoreLockError => vec![
                "The template store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::CompositionDepthExceeded { limit } => vec![
                format!("Composed units kept composing more units past {} pass(es)", limit),
                "Raise engine.max_composition_depth if this is intended".into(),
            ],
            Self::NestingDepthExceeded { limit } => vec![
                format!("Nested runs are limited to a depth of {}", limit),
                "Check for a blueprint that launches itself".into(),
                "Raise engine.max_nesting_depth if this is intended".into(),
            ],
            Self::UnknownBlueprint(_) => vec![
                "Try: gantry list to see available blueprints".into(),
            ],
            Self::BlueprintInvalid { path, .. } => vec![
                format!("Fix or remove {}", path.display()),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PhaseCallback { source, .. } => source.category(),
            Self::TaskFailed { .. } => ErrorCategory::Validation,
            Self::RenderingFailed { .. } => ErrorCategory::Validation,
            Self::TemplateNotFound { .. } | Self::UnknownBlueprint(_) => ErrorCategory::NotFound,
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::SettingsError { .. } | Self::BlueprintInvalid { .. } => {
                ErrorCategory::Configuration
            }
            Self::PromptFailed { .. } => ErrorCategory::Internal,
            Self::CompositionDepthExceeded { .. } | Self::NestingDepthExceeded { .. } => {
                ErrorCategory::Composition
            }
            Self::PromptOutsidePrompting { .. }
            | Self::ComposeOutsideComposing { .. }
            | Self::WriteOutsideWritingPhase { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}
