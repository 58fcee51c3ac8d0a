//! Composition resolver: orders unit manifests into an [`ExecutionPlan`].
//!
//! Kahn's algorithm over the "depends on" graph. Among units that are ready
//! at the same time, the lowest priority goes first, then the earliest
//! registration. The result is a single global order reused by every phase.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::{
    entities::{ExecutionPlan, UnitManifest},
    error::DomainError,
    value_objects::UnitName,
};

pub struct CompositionResolver;

impl CompositionResolver {
    /// Order `units`, given in registration order.
    ///
    /// # Errors
    /// - `DuplicateUnit` if two manifests share a name
    /// - `MissingDependency` if a dependency names no registered unit
    /// - `CyclicDependency` with the members of one actual cycle
    #[instrument(skip_all, fields(units = units.len()))]
    pub fn resolve(units: &[UnitManifest]) -> Result<ExecutionPlan, DomainError> {
        Self::extend(&ExecutionPlan::default(), units)
    }

    /// Re-resolve after new units were registered.
    ///
    /// `units` is the complete registration list. Units already in `plan`
    /// keep their relative order and stay in front; only the remaining units
    /// are sorted and appended. Already-planned units can only depend on
    /// already-planned units (their dependencies were complete when they
    /// were resolved), so appending never breaks a dependency edge.
    #[instrument(skip_all, fields(planned = plan.len(), units = units.len()))]
    pub fn extend(plan: &ExecutionPlan, units: &[UnitManifest]) -> Result<ExecutionPlan, DomainError> {
        let index = Self::index(units)?;

        for unit in units {
            for dep in unit.dependencies() {
                if !index.contains_key(dep.as_str()) {
                    return Err(DomainError::MissingDependency {
                        unit: unit.name().to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }

        let mut placed = vec![false; units.len()];
        let mut order: Vec<UnitName> = Vec::with_capacity(units.len());
        for name in plan {
            if let Some(&i) = index.get(name.as_str()) {
                placed[i] = true;
                order.push(name.clone());
            }
        }

        // remaining[i]: dependencies of i not yet placed
        // dependents[j]: units waiting on j
        let mut remaining = vec![0usize; units.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); units.len()];
        for (i, unit) in units.iter().enumerate() {
            if placed[i] {
                continue;
            }
            for dep in unit.dependencies() {
                let j = index[dep.as_str()];
                if !placed[j] {
                    remaining[i] += 1;
                    dependents[j].push(i);
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<(i32, usize)>> = units
            .iter()
            .enumerate()
            .filter(|(i, _)| !placed[*i] && remaining[*i] == 0)
            .map(|(i, u)| Reverse((u.priority(), i)))
            .collect();

        while let Some(Reverse((_, i))) = ready.pop() {
            placed[i] = true;
            order.push(units[i].name().clone());
            for &d in &dependents[i] {
                remaining[d] -= 1;
                if remaining[d] == 0 {
                    ready.push(Reverse((units[d].priority(), d)));
                }
            }
        }

        if order.len() < units.len() {
            let members = Self::find_cycle(units, &index, &placed);
            return Err(DomainError::CyclicDependency { members });
        }

        debug!(order = ?order.iter().map(UnitName::as_str).collect::<Vec<_>>(), "resolved plan");
        Ok(ExecutionPlan::from_order(order))
    }

    fn index(units: &[UnitManifest]) -> Result<HashMap<&str, usize>, DomainError> {
        let mut index = HashMap::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            if index.insert(unit.name().as_str(), i).is_some() {
                return Err(DomainError::DuplicateUnit(unit.name().to_string()));
            }
        }
        Ok(index)
    }

    /// Walk unplaced dependency edges from the first unplaced unit until a
    /// unit repeats. Every unplaced unit has at least one unplaced
    /// dependency, so the walk always closes a cycle.
    fn find_cycle(
        units: &[UnitManifest],
        index: &HashMap<&str, usize>,
        placed: &[bool],
    ) -> Vec<String> {
        let Some(start) = placed.iter().position(|p| !p) else {
            return Vec::new();
        };

        let mut path: Vec<usize> = Vec::new();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut current = start;

        while seen.insert(current) {
            path.push(current);
            let next = units[current]
                .dependencies()
                .iter()
                .map(|d| index[d.as_str()])
                .find(|j| !placed[*j]);
            match next {
                Some(j) => current = j,
                None => break,
            }
        }

        let from = path.iter().position(|&i| i == current).unwrap_or(0);
        path[from..]
            .iter()
            .map(|&i| units[i].name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, priority: i32, deps: &[&str]) -> UnitManifest {
        UnitManifest::builder(name)
            .priority(priority)
            .dependencies(deps.iter().copied())
            .build()
            .unwrap()
    }

    fn names(plan: &ExecutionPlan) -> Vec<String> {
        plan.names()
    }

    #[test]
    fn dependency_runs_first() {
        let plan = CompositionResolver::resolve(&[unit("u2", 0, &["u1"]), unit("u1", 0, &[])])
            .unwrap();
        assert_eq!(names(&plan), ["u1", "u2"]);
    }

    #[test]
    fn ties_break_by_priority_then_registration() {
        let plan = CompositionResolver::resolve(&[
            unit("late", 10, &[]),
            unit("b", 0, &[]),
            unit("a", 0, &[]),
            unit("early", -5, &[]),
        ])
        .unwrap();
        assert_eq!(names(&plan), ["early", "b", "a", "late"]);
    }

    #[test]
    fn missing_dependency_is_reported() {
        let err = CompositionResolver::resolve(&[unit("u", 0, &["ghost"])]).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingDependency {
                unit: "u".into(),
                dependency: "ghost".into()
            }
        );
    }

    #[test]
    fn duplicate_unit_is_rejected() {
        let err = CompositionResolver::resolve(&[unit("u", 0, &[]), unit("u", 1, &[])])
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateUnit("u".into()));
    }

    #[test]
    fn cycle_members_are_named() {
        let err = CompositionResolver::resolve(&[
            unit("free", 0, &[]),
            unit("a", 0, &["b"]),
            unit("b", 0, &["c"]),
            unit("c", 0, &["a"]),
            unit("tail", 0, &["a"]),
        ])
        .unwrap_err();

        match err {
            DomainError::CyclicDependency { members } => {
                assert_eq!(members, ["a", "b", "c"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let err = CompositionResolver::resolve(&[unit("me", 0, &["me"])]).unwrap_err();
        assert_eq!(
            err,
            DomainError::CyclicDependency {
                members: vec!["me".into()]
            }
        );
    }

    #[test]
    fn extend_keeps_existing_order() {
        let mut units = vec![unit("hi", 5, &[]), unit("lo", 0, &["hi"])];
        let plan = CompositionResolver::resolve(&units).unwrap();
        assert_eq!(names(&plan), ["hi", "lo"]);

        // A new low-priority unit would sort first on a fresh resolve, but
        // planned units keep their place.
        units.push(unit("new", -10, &["lo"]));
        units.push(unit("newer", -20, &[]));
        let plan = CompositionResolver::extend(&plan, &units).unwrap();
        assert_eq!(names(&plan), ["hi", "lo", "newer", "new"]);
    }

    #[test]
    fn extend_still_rejects_missing_dependencies() {
        let mut units = vec![unit("a", 0, &[])];
        let plan = CompositionResolver::resolve(&units).unwrap();
        units.push(unit("b", 0, &["ghost"]));
        assert!(matches!(
            CompositionResolver::extend(&plan, &units),
            Err(DomainError::MissingDependency { .. })
        ));
    }
}
