//! Property tests for dependency ordering.

use gantry_core::domain::{CompositionResolver, DomainError, UnitManifest};
use proptest::prelude::*;

/// (priority, dependencies on lower indices) per unit. Always acyclic.
fn dag_strategy() -> impl Strategy<Value = Vec<(i32, Vec<usize>)>> {
    (1usize..12).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                let deps = if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    prop::collection::vec(0..i, 0..=i.min(3)).boxed()
                };
                (-5i32..5, deps)
            })
            .collect::<Vec<_>>()
    })
}

fn manifests(graph: &[(i32, Vec<usize>)]) -> Vec<UnitManifest> {
    graph.iter()
        .enumerate()
        .map(|(i, (priority, deps))| {
            UnitManifest::builder(format!("unit-{i}"))
                .priority(*priority)
                .dependencies(deps.iter().map(|d| format!("unit-{d}")))
                .build()
                .unwrap()
        })
        .collect()
}

#[test]
fn prop_dependencies_precede_dependents() {
    proptest!(|(graph in dag_strategy(), seed in any::<u64>())| {
        let mut units = manifests(&graph);
        // Registration order must not matter for correctness.
        let len = units.len();
        units.rotate_left((seed as usize) % len);

        let plan = CompositionResolver::resolve(&units).unwrap();
        prop_assert_eq!(plan.len(), units.len());

        for unit in &units {
            let at = plan.position(unit.name().as_str()).unwrap();
            for dep in unit.dependencies() {
                let dep_at = plan.position(dep.as_str()).unwrap();
                prop_assert!(dep_at < at, "{} must run before {}", dep, unit.name());
            }
        }
    });
}

#[test]
fn prop_resolution_is_deterministic() {
    proptest!(|(graph in dag_strategy())| {
        let units = manifests(&graph);
        let first = CompositionResolver::resolve(&units).unwrap();
        let second = CompositionResolver::resolve(&units).unwrap();
        prop_assert_eq!(first, second);
    });
}

#[test]
fn prop_independent_units_follow_priority_then_registration() {
    proptest!(|(priorities in prop::collection::vec(-3i32..3, 1..10))| {
        let graph: Vec<(i32, Vec<usize>)> = priorities.iter().map(|p| (*p, Vec::new())).collect();
        let plan = CompositionResolver::resolve(&manifests(&graph)).unwrap();

        let mut expected: Vec<usize> = (0..priorities.len()).collect();
        expected.sort_by_key(|i| (priorities[*i], *i));
        let expected: Vec<String> = expected.into_iter().map(|i| format!("unit-{i}")).collect();
        prop_assert_eq!(plan.names(), expected);
    });
}

#[test]
fn prop_back_edge_is_reported_as_cycle() {
    proptest!(|(graph in dag_strategy().prop_filter("needs two units", |s| s.len() > 1))| {
        let mut graph = graph;
        let last = graph.len() - 1;
        // Chain everything so unit-0 -> unit-last closes a loop.
        for (i, (_, deps)) in graph.iter_mut().enumerate().skip(1) {
            if !deps.contains(&(i - 1)) {
                deps.push(i - 1);
            }
        }
        graph[0].1.push(last);

        let units = manifests(&graph);
        match CompositionResolver::resolve(&units) {
            Err(DomainError::CyclicDependency { members }) => {
                prop_assert!(!members.is_empty());
                for member in &members {
                    prop_assert!(units.iter().any(|u| u.name().as_str() == member.as_str()));
                }
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    });
}
