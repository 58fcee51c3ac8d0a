//! Generator units: manifest + tasks + file sections.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::application::task::TaskContext;
use crate::domain::{
    DomainError, FileSection, Phase, RoleCandidate, UnitManifest, UnitName,
};
use crate::error::GantryResult;

type TaskFn = dyn Fn(&mut TaskContext<'_>) -> GantryResult<()> + Send + Sync;

/// One phase callback of a unit.
#[derive(Clone)]
pub struct Task {
    name: String,
    run: Arc<TaskFn>,
}

impl Task {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut TaskContext<'_>) -> GantryResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, ctx: &mut TaskContext<'_>) -> GantryResult<()> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish()
    }
}

/// A self-contained contributor of phase tasks and file sections.
///
/// Immutable once built; cheap to clone (tasks are shared).
#[derive(Debug, Clone)]
pub struct GeneratorUnit {
    manifest: UnitManifest,
    tasks: BTreeMap<Phase, Vec<Task>>,
    sections: BTreeMap<Phase, Vec<FileSection>>,
}

impl GeneratorUnit {
    pub fn builder(manifest: UnitManifest) -> GeneratorUnitBuilder {
        GeneratorUnitBuilder {
            manifest,
            tasks: BTreeMap::new(),
            sections: BTreeMap::new(),
        }
    }

    pub fn manifest(&self) -> &UnitManifest {
        &self.manifest
    }

    pub fn name(&self) -> &UnitName {
        self.manifest.name()
    }

    pub fn tasks(&self, phase: Phase) -> &[Task] {
        self.tasks.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sections(&self, phase: Phase) -> &[FileSection] {
        self.sections.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Phases in which the unit does anything.
    pub fn active_phases(&self) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|p| !self.tasks(*p).is_empty() || !self.sections(*p).is_empty())
            .collect()
    }

    pub fn section_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

impl RoleCandidate for GeneratorUnit {
    fn unit_name(&self) -> &UnitName {
        self.manifest.name()
    }
}

pub struct GeneratorUnitBuilder {
    manifest: UnitManifest,
    tasks: BTreeMap<Phase, Vec<Task>>,
    sections: BTreeMap<Phase, Vec<FileSection>>,
}

impl GeneratorUnitBuilder {
    /// Add a task; tasks of one phase run in the order they were added.
    pub fn task<F>(mut self, phase: Phase, name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut TaskContext<'_>) -> GantryResult<()> + Send + Sync + 'static,
    {
        self.tasks
            .entry(phase)
            .or_default()
            .push(Task::new(name, run));
        self
    }

    pub fn section(mut self, phase: Phase, section: FileSection) -> Self {
        self.sections.entry(phase).or_default().push(section);
        self
    }

    /// Sections are only allowed in the writing phases.
    pub fn build(self) -> Result<GeneratorUnit, DomainError> {
        if let Some(phase) = self.sections.keys().find(|p| !p.writes_files()) {
            return Err(DomainError::InvalidUnit {
                unit: self.manifest.name().to_string(),
                reason: format!("file sections are not allowed in the {phase} phase"),
            });
        }

        Ok(GeneratorUnit {
            manifest: self.manifest,
            tasks: self.tasks,
            sections: self.sections,
        })
    }
}
