//! Unified error handling for Gantry Core.
//!
//! Wraps domain and application errors behind one type with a stable error
//! kind (reported when a run aborts), a display category and user-actionable
//! suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Gantry Core operations.
#[derive(Debug, Error, Clone)]
pub enum GantryError {
    /// Resolution, registry, path and conflict errors.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Run orchestration and port failures.
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl GantryError {
    /// Stable name of the error kind, e.g. `CyclicDependency`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Domain(e) => match e {
                DomainError::InvalidName { .. } => "InvalidName",
                DomainError::UnknownPhase(_) => "UnknownPhase",
                DomainError::InvalidUnit { .. } => "InvalidUnit",
                DomainError::InvalidContext(_) => "InvalidContext",
                DomainError::AbsolutePathNotAllowed { .. } => "AbsolutePathNotAllowed",
                DomainError::PathEscapesRoot { .. } => "PathEscapesRoot",
                DomainError::MissingRequiredField { .. } => "MissingRequiredField",
                DomainError::UnresolvedPlaceholder { .. } => "UnresolvedPlaceholder",
                DomainError::DuplicateUnit(_) => "DuplicateUnit",
                DomainError::MissingDependency { .. } => "MissingDependency",
                DomainError::CyclicDependency { .. } => "CyclicDependency",
                DomainError::RoleConflict { .. } => "RoleConflict",
                DomainError::UnknownRole(_) => "UnknownRole",
                DomainError::DestinationConflict { .. } => "DestinationConflict",
            },
            Self::Application(e) => e.kind(),
            Self::Configuration { .. } => "Configuration",
            Self::Internal { .. } => "Internal",
        }
    }

    /// The innermost error, looking through phase callback wrappers.
    pub fn root_cause(&self) -> &GantryError {
        match self {
            Self::Application(ApplicationError::PhaseCallback { source, .. }) => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your config file and GANTRY_* environment variables".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in Gantry".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Composition => ErrorCategory::Composition,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Shorthand for a task signalling failure with a message.
    pub fn task_failed(reason: impl Into<String>) -> Self {
        ApplicationError::TaskFailed {
            reason: reason.into(),
        }
        .into()
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Composition,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type GantryResult<T> = Result<T, GantryError>;
