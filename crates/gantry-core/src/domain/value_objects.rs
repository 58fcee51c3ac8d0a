//! Value objects for the generation domain.
//!
//! These are small, immutable, `Copy`/`Clone` types that carry no identity
//! of their own: lifecycle phases and the names used to refer to units and
//! roles.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

// ============================================================================
// Phase
// ============================================================================

/// One stage of the fixed generation lifecycle.
///
/// The declaration order *is* the execution order; `Ord` is derived so phases
/// can be compared and used as ordered map keys.
///
/// | Phase | Purpose |
/// |-------|---------|
/// | `Initializing` | option parsing, validation, seeding defaults |
/// | `Prompting` | interactive or defaulted input collection |
/// | `Composing` | runtime discovery of further units |
/// | `Configuring` | context finalisation |
/// | `Writing` | application-level file writes |
/// | `WritingEntities` | per-entity file writes |
/// | `Install` | post-generation actions |
/// | `End` | teardown |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Initializing,
    Prompting,
    Composing,
    Configuring,
    Writing,
    WritingEntities,
    Install,
    End,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Phase; 8] = [
        Phase::Initializing,
        Phase::Prompting,
        Phase::Composing,
        Phase::Configuring,
        Phase::Writing,
        Phase::WritingEntities,
        Phase::Install,
        Phase::End,
    ];

    /// Whether the phase runs once per run or once per entity.
    pub const fn scope(self) -> PhaseScope {
        match self {
            Phase::WritingEntities => PhaseScope::Entity,
            _ => PhaseScope::Application,
        }
    }

    /// Phases during which file sections are materialised.
    pub const fn writes_files(self) -> bool {
        matches!(self, Phase::Writing | Phase::WritingEntities)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::Prompting => "prompting",
            Phase::Composing => "composing",
            Phase::Configuring => "configuring",
            Phase::Writing => "writing",
            Phase::WritingEntities => "writing-entities",
            Phase::Install => "install",
            Phase::End => "end",
        }
    }

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Phase> {
        let idx = Phase::ALL.iter().position(|p| *p == self)?;
        Phase::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownPhase(s.to_string()))
    }
}

/// Execution context of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseScope {
    /// Tasks run once per run.
    Application,
    /// Tasks run once per entity, in entity-list order.
    Entity,
}

// ============================================================================
// Names
// ============================================================================

/// Validate an identifier used for units and roles.
fn validate_identifier(kind: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidName {
            kind,
            name: value.to_string(),
            reason: "cannot be empty".into(),
        });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidName {
            kind,
            name: value.to_string(),
            reason: "cannot contain whitespace".into(),
        });
    }
    Ok(())
}

macro_rules! name_type {
    ($(#[$meta:meta])* $ty:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $ty(String);

        impl $ty {
            /// Create a validated name.
            ///
            /// # Panics
            /// Panics on an invalid name (use `parse` for fallible construction).
            pub fn new(name: impl Into<String>) -> Self {
                let name = name.into();
                if let Err(e) = validate_identifier($kind, &name) {
                    panic!("{e}");
                }
                Self(name)
            }

            /// Fallible constructor.
            pub fn parse(name: impl Into<String>) -> Result<Self, DomainError> {
                let name = name.into();
                validate_identifier($kind, &name)?;
                Ok(Self(name))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl From<$ty> for String {
            fn from(name: $ty) -> Self {
                name.0
            }
        }
    };
}

name_type!(
    /// Unique name of a generator unit within one run (e.g. `flutter-client`).
    UnitName,
    "unit"
);

name_type!(
    /// Abstract capability slot satisfied by exactly one unit per run
    /// (e.g. `app`, `client`).
    RoleName,
    "role"
);
