//! Blueprints: named sets of role registrations, and the catalog of them.

use std::collections::BTreeMap;

use crate::application::unit::GeneratorUnit;
use crate::domain::{BlueprintRegistry, RoleName};

#[derive(Debug, Clone)]
struct Registration {
    role: RoleName,
    unit: GeneratorUnit,
    priority: i32,
}

/// A named, runnable composition of generator units.
///
/// Each unit is registered under a role. A unit registered without an
/// explicit role claims the role named after itself, so it can only be
/// replaced deliberately.
#[derive(Debug, Clone)]
pub struct Blueprint {
    name: String,
    description: String,
    registrations: Vec<Registration>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            registrations: Vec::new(),
        }
    }

    /// Register a unit under its own name at priority 0.
    pub fn with_unit(self, unit: GeneratorUnit) -> Self {
        let role = RoleName::new(unit.name().as_str());
        self.with_role(role, unit, 0)
    }

    /// Register a unit for `role`.
    pub fn with_role(mut self, role: RoleName, unit: GeneratorUnit, priority: i32) -> Self {
        self.registrations.push(Registration {
            role,
            unit,
            priority,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// All registered units, overridden ones included, in registration order.
    pub fn units(&self) -> impl Iterator<Item = &GeneratorUnit> {
        self.registrations.iter().map(|r| &r.unit)
    }

    /// Distinct roles, in first-registration order.
    pub fn roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = Vec::new();
        for r in &self.registrations {
            if !roles.iter().any(|x| x == r.role.as_str()) {
                roles.push(r.role.to_string());
            }
        }
        roles
    }

    /// A fresh registry for one run.
    pub fn registry(&self, strict_roles: bool) -> BlueprintRegistry<GeneratorUnit> {
        let mut registry = BlueprintRegistry::new().strict(strict_roles);
        for r in &self.registrations {
            registry.register_role(r.role.clone(), r.unit.clone(), r.priority);
        }
        registry
    }
}

/// Summary used by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintInfo {
    pub name: String,
    pub description: String,
    pub roles: Vec<String>,
    pub units: usize,
}

impl From<&Blueprint> for BlueprintInfo {
    fn from(bp: &Blueprint) -> Self {
        Self {
            name: bp.name.clone(),
            description: bp.description.clone(),
            roles: bp.roles(),
            units: bp.registrations.len(),
        }
    }
}

/// Blueprints available to a service, by name.
///
/// Nested runs look blueprints up here.
#[derive(Debug, Clone, Default)]
pub struct BlueprintCatalog {
    blueprints: BTreeMap<String, Blueprint>,
}

impl BlueprintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a blueprint. Returns the replaced one, if any.
    pub fn register(&mut self, blueprint: Blueprint) -> Option<Blueprint> {
        self.blueprints.insert(blueprint.name.clone(), blueprint)
    }

    pub fn with(mut self, blueprint: Blueprint) -> Self {
        self.register(blueprint);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blueprints.contains_key(name)
    }

    /// Blueprints sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.values()
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    /// Merge another catalog in; entries from `other` replace same-named ones.
    pub fn extend(&mut self, other: BlueprintCatalog) {
        self.blueprints.extend(other.blueprints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitManifest;

    fn unit(name: &str) -> GeneratorUnit {
        GeneratorUnit::builder(UnitManifest::builder(name).build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn units_default_to_their_own_role() {
        let bp = Blueprint::new("bp", "")
            .with_unit(unit("a"))
            .with_role(RoleName::new("app"), unit("b"), 0)
            .with_role(RoleName::new("app"), unit("c"), 10);

        assert_eq!(bp.roles(), ["a", "app"]);
        let resolved = bp.registry(false).resolve().unwrap();
        let names: Vec<&str> = resolved.units().map(|u| u.name().as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn catalog_is_sorted_and_replaceable() {
        let mut catalog = BlueprintCatalog::new()
            .with(Blueprint::new("zeta", "z"))
            .with(Blueprint::new("alpha", "a"));
        let names: Vec<&str> = catalog.iter().map(Blueprint::name).collect();
        assert_eq!(names, ["alpha", "zeta"]);

        let old = catalog.register(Blueprint::new("alpha", "replaced"));
        assert_eq!(old.map(|b| b.description().to_string()).as_deref(), Some("a"));
        assert_eq!(catalog.get("alpha").unwrap().description(), "replaced");
    }
}
