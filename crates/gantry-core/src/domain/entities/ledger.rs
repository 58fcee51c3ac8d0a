use std::collections::HashMap;
use std::fmt;

use crate::domain::{
    entities::common::RelativePath,
    error::DomainError,
    value_objects::{Phase, UnitName},
};

/// What to do when two sections resolve to the same destination in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Abort the run with `DestinationConflict`.
    #[default]
    Strict,
    /// Report the conflict and let the second write win.
    LastWriterWins,
}

/// Who produced a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOrigin {
    pub unit: UnitName,
    pub phase: Phase,
    pub entity: Option<String>,
}

impl fmt::Display for WriteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(f, "{} ({}, entity {})", self.unit, self.phase, entity),
            None => write!(f, "{} ({})", self.unit, self.phase),
        }
    }
}

/// A reported (lenient mode) destination conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConflict {
    pub path: RelativePath,
    pub first: WriteOrigin,
    pub second: WriteOrigin,
}

impl DestinationConflict {
    fn into_error(self) -> DomainError {
        DomainError::DestinationConflict {
            path: self.path.to_string(),
            first_unit: self.first.unit.to_string(),
            first_phase: self.first.phase.to_string(),
            second_unit: self.second.unit.to_string(),
            second_phase: self.second.phase.to_string(),
        }
    }
}

/// Tracks every destination written during one run.
///
/// Paths are relative to the run's base directory, so nested runs keep their
/// own ledger.
#[derive(Debug, Clone, Default)]
pub struct WriteLedger {
    policy: ConflictPolicy,
    entries: Vec<(RelativePath, WriteOrigin)>,
    index: HashMap<RelativePath, usize>,
    conflicts: Vec<DestinationConflict>,
}

impl WriteLedger {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Claim `path` for `origin`.
    ///
    /// Strict policy: a second claim fails and nothing is recorded.
    /// Lenient policy: the conflict is reported and the new origin replaces
    /// the old one.
    pub fn claim(&mut self, path: &RelativePath, origin: WriteOrigin) -> Result<(), DomainError> {
        let Some(&idx) = self.index.get(path) else {
            self.index.insert(path.clone(), self.entries.len());
            self.entries.push((path.clone(), origin));
            return Ok(());
        };

        let conflict = DestinationConflict {
            path: path.clone(),
            first: self.entries[idx].1.clone(),
            second: origin.clone(),
        };

        match self.policy {
            ConflictPolicy::Strict => Err(conflict.into_error()),
            ConflictPolicy::LastWriterWins => {
                self.entries[idx].1 = origin;
                self.conflicts.push(conflict);
                Ok(())
            }
        }
    }

    /// Claimed paths in first-claim order, with their current owner.
    pub fn entries(&self) -> &[(RelativePath, WriteOrigin)] {
        &self.entries
    }

    pub fn conflicts(&self) -> &[DestinationConflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
