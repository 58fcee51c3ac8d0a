//! Blueprint registry: role name -> the unit that satisfies it.
//!
//! Several units may register for the same role. The highest priority wins;
//! equal priorities fall back to registration order (earliest wins) unless
//! strict mode turns the tie into `RoleConflict`. Losing registrations are
//! kept so a run can report what was overridden.

use std::collections::HashSet;

use crate::domain::{
    entities::UnitManifest,
    error::DomainError,
    value_objects::{RoleName, UnitName},
};

/// Anything that can be bound to a role.
pub trait RoleCandidate {
    fn unit_name(&self) -> &UnitName;
}

impl RoleCandidate for UnitManifest {
    fn unit_name(&self) -> &UnitName {
        self.name()
    }
}

#[derive(Debug, Clone)]
pub struct RoleBinding<U> {
    pub role: RoleName,
    pub unit: U,
    pub priority: i32,
    seq: usize,
}

impl<U> RoleBinding<U> {
    /// Registration sequence number within the registry.
    pub fn seq(&self) -> usize {
        self.seq
    }
}

/// A binding that lost its role to `winner`.
#[derive(Debug, Clone)]
pub struct OverriddenBinding<U> {
    pub binding: RoleBinding<U>,
    pub winner: UnitName,
}

/// Outcome of role resolution for one run. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ResolvedRoles<U> {
    /// One binding per role, in registration order of the winning binding.
    pub winners: Vec<RoleBinding<U>>,
    pub overridden: Vec<OverriddenBinding<U>>,
}

impl<U> ResolvedRoles<U> {
    pub fn units(&self) -> impl Iterator<Item = &U> {
        self.winners.iter().map(|b| &b.unit)
    }

    pub fn into_units(self) -> Vec<U> {
        self.winners.into_iter().map(|b| b.unit).collect()
    }
}

#[derive(Debug, Clone)]
pub struct BlueprintRegistry<U> {
    bindings: Vec<RoleBinding<U>>,
    strict: bool,
}

impl<U> Default for BlueprintRegistry<U> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            strict: false,
        }
    }
}

impl<U: RoleCandidate> BlueprintRegistry<U> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat equal-priority registrations for one role as a conflict.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn register_role(&mut self, role: RoleName, unit: U, priority: i32) {
        let seq = self.bindings.len();
        self.bindings.push(RoleBinding {
            role,
            unit,
            priority,
            seq,
        });
    }

    pub fn bindings(&self) -> &[RoleBinding<U>] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Distinct roles in first-registration order.
    pub fn roles(&self) -> Vec<&RoleName> {
        let mut seen = HashSet::new();
        self.bindings
            .iter()
            .filter(|b| seen.insert(&b.role))
            .map(|b| &b.role)
            .collect()
    }

    /// The unit that currently wins `role`.
    pub fn resolve_role(&self, role: &str) -> Result<&U, DomainError> {
        let idx = self.winner(role)?;
        Ok(&self.bindings[idx].unit)
    }

    /// Resolve every role at once, consuming the registry.
    pub fn resolve(self) -> Result<ResolvedRoles<U>, DomainError> {
        let mut winning = HashSet::new();
        for role in self.roles() {
            winning.insert(self.winner(role.as_str())?);
        }

        let winner_names: Vec<(RoleName, UnitName)> = winning
            .iter()
            .map(|&i| {
                let b = &self.bindings[i];
                (b.role.clone(), b.unit.unit_name().clone())
            })
            .collect();

        let mut winners = Vec::new();
        let mut overridden = Vec::new();
        for binding in self.bindings {
            if winning.contains(&binding.seq) {
                winners.push(binding);
            } else {
                let winner = winner_names
                    .iter()
                    .find(|(role, _)| *role == binding.role)
                    .map(|(_, name)| name.clone())
                    .unwrap_or_else(|| binding.unit.unit_name().clone());
                overridden.push(OverriddenBinding { binding, winner });
            }
        }

        Ok(ResolvedRoles {
            winners,
            overridden,
        })
    }

    fn winner(&self, role: &str) -> Result<usize, DomainError> {
        let mut best: Option<&RoleBinding<U>> = None;
        let mut tied: Option<&RoleBinding<U>> = None;

        for b in self.bindings.iter().filter(|b| b.role.as_str() == role) {
            match best {
                Some(cur) if b.priority > cur.priority => {
                    best = Some(b);
                    tied = None;
                }
                Some(cur) if b.priority == cur.priority => {
                    tied.get_or_insert(b);
                }
                Some(_) => {}
                None => best = Some(b),
            }
        }

        let best = best.ok_or_else(|| DomainError::UnknownRole(role.to_string()))?;
        if let (true, Some(other)) = (self.strict, tied) {
            return Err(DomainError::RoleConflict {
                role: role.to_string(),
                first: best.unit.unit_name().to_string(),
                second: other.unit.unit_name().to_string(),
                priority: best.priority,
            });
        }
        Ok(best.seq)
    }
}
