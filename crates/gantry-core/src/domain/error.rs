// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they are stored in run reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("unknown phase '{0}'")]
    UnknownPhase(String),

    #[error("invalid unit '{unit}': {reason}")]
    InvalidUnit { unit: String, reason: String },

    #[error("invalid application context: {0}")]
    InvalidContext(String),

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("path escapes the output root: {path}")]
    PathEscapesRoot { path: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("unresolved placeholder '{{{{{placeholder}}}}}'")]
    UnresolvedPlaceholder { placeholder: String },

    // ========================================================================
    // Composition Errors
    // ========================================================================
    #[error("unit '{0}' is registered more than once")]
    DuplicateUnit(String),

    #[error("unit '{unit}' depends on '{dependency}', which is not registered")]
    MissingDependency { unit: String, dependency: String },

    #[error("cyclic dependency between units: {}", .members.join(" -> "))]
    CyclicDependency { members: Vec<String> },

    #[error("role '{role}' is claimed by '{first}' and '{second}' at equal priority {priority}")]
    RoleConflict {
        role: String,
        first: String,
        second: String,
        priority: i32,
    },

    #[error("no unit is registered for role '{0}'")]
    UnknownRole(String),

    // ========================================================================
    // Output Errors
    // ========================================================================
    #[error(
        "destination '{path}' written by {first_unit} ({first_phase}) is written again by {second_unit} ({second_phase})"
    )]
    DestinationConflict {
        path: String,
        first_unit: String,
        first_phase: String,
        second_unit: String,
        second_phase: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingDependency { unit, dependency } => vec![
                format!("Unit '{}' requires '{}'", unit, dependency),
                format!("Register a unit named '{}' or remove the dependency", dependency),
                "Try: gantry list to see available blueprints and units".into(),
            ],
            Self::CyclicDependency { members } => vec![
                format!("These units depend on each other: {}", members.join(", ")),
                "Remove one of the dependencies to break the cycle".into(),
            ],
            Self::RoleConflict { role, .. } => vec![
                format!("Give one registration for role '{}' a higher priority", role),
                "Or disable strict role resolution (engine.strict_roles = false)".into(),
            ],
            Self::DestinationConflict { path, .. } => vec![
                format!("Two file sections produce '{}'", path),
                "Rename one destination, or run with --lenient to let the last writer win".into(),
            ],
            Self::DuplicateUnit(name) => vec![
                format!("Unit names must be unique; '{}' appears twice", name),
            ],
            Self::UnknownRole(role) => vec![
                format!("Register a unit for role '{}'", role),
                "Try: gantry plan <blueprint> to inspect role bindings".into(),
            ],
            Self::UnresolvedPlaceholder { placeholder } => vec![
                format!("No variable named '{}' is in scope", placeholder),
                "Set it in the application config or disable strict rendering".into(),
            ],
            Self::AbsolutePathNotAllowed { .. } | Self::PathEscapesRoot { .. } => vec![
                "Destination rules must produce paths relative to the output root".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidName { .. }
            | Self::UnknownPhase(_)
            | Self::InvalidUnit { .. }
            | Self::InvalidContext(_)
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. }
            | Self::MissingRequiredField { .. }
            | Self::UnresolvedPlaceholder { .. } => ErrorCategory::Validation,
            Self::DuplicateUnit(_)
            | Self::CyclicDependency { .. }
            | Self::RoleConflict { .. }
            | Self::DestinationConflict { .. } => ErrorCategory::Composition,
            Self::MissingDependency { .. } | Self::UnknownRole(_) => ErrorCategory::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Composition,
    NotFound,
}
