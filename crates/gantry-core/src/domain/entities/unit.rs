use std::fmt;

use crate::domain::{error::DomainError, value_objects::UnitName};

/// Identity and ordering metadata of a generator unit.
///
/// This is everything the composition resolver needs to know about a unit;
/// tasks and sections live on the application-layer `GeneratorUnit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitManifest {
    name: UnitName,
    version: String,
    priority: i32,
    dependencies: Vec<UnitName>,
    description: Option<String>,
}

impl UnitManifest {
    pub fn builder(name: impl Into<String>) -> UnitManifestBuilder {
        UnitManifestBuilder {
            name: name.into(),
            version: None,
            priority: 0,
            dependencies: Vec::new(),
            description: None,
        }
    }

    pub fn name(&self) -> &UnitName {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Higher priority runs later among units with no ordering constraint.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Declared dependencies in declaration order, without duplicates.
    pub fn dependencies(&self) -> &[UnitName] {
        &self.dependencies
    }

    pub fn depends_on(&self, other: &str) -> bool {
        self.dependencies.iter().any(|d| d.as_str() == other)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for UnitManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

#[derive(Debug, Default)]
pub struct UnitManifestBuilder {
    name: String,
    version: Option<String>,
    priority: i32,
    dependencies: Vec<String>,
    description: Option<String>,
}

impl UnitManifestBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn build(self) -> Result<UnitManifest, DomainError> {
        let name = UnitName::parse(self.name)?;

        let version = self.version.unwrap_or_else(|| "0.1.0".to_string());
        if version.trim().is_empty() {
            return Err(DomainError::InvalidUnit {
                unit: name.to_string(),
                reason: "version cannot be empty".into(),
            });
        }

        let mut dependencies: Vec<UnitName> = Vec::with_capacity(self.dependencies.len());
        for dep in self.dependencies {
            let dep = UnitName::parse(dep)?;
            if !dependencies.contains(&dep) {
                dependencies.push(dep);
            }
        }

        Ok(UnitManifest {
            name,
            version,
            priority: self.priority,
            dependencies,
            description: self.description,
        })
    }
}
