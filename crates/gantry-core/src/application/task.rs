//! What a running task can see and do.

use std::path::Path;

use tracing::{debug, info_span};

use crate::{
    application::{
        ApplicationError,
        ports::{Question, SettingsStore, WriteOutcome},
        services::{generation_service::GenerationService, scheduler::ActiveRun},
        unit::GeneratorUnit,
    },
    domain::{
        ApplicationContext, ConfigMap, EntityDescriptor, FileSection, Phase, RelativePath,
        RenderContext, RenderedFile, UnitName,
    },
    error::GantryResult,
};

/// Handle lent to exactly one task at a time.
///
/// Everything a task touches goes through here: the application context,
/// the settings session, prompts (Prompting only), composition (Composing
/// only), file writes (writing phases only) and nested runs.
pub struct TaskContext<'a> {
    service: &'a GenerationService,
    depth: usize,
    phase: Phase,
    unit: &'a UnitName,
    entity: Option<usize>,
    run: &'a mut ActiveRun,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(
        service: &'a GenerationService,
        depth: usize,
        phase: Phase,
        unit: &'a UnitName,
        entity: Option<usize>,
        run: &'a mut ActiveRun,
    ) -> Self {
        Self {
            service,
            depth,
            phase,
            unit,
            entity,
            run,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn unit(&self) -> &UnitName {
        self.unit
    }

    /// Nesting depth of the current run (0 for the top-level run).
    pub fn depth(&self) -> usize {
        self.depth
    }

    // ── context ────────────────────────────────────────────────────────────

    pub fn app(&self) -> &ApplicationContext {
        &self.run.app
    }

    pub fn app_mut(&mut self) -> &mut ApplicationContext {
        &mut self.run.app
    }

    /// The current entity in entity-scoped phases.
    pub fn entity(&self) -> Option<&EntityDescriptor> {
        self.entity.and_then(|i| self.run.app.entities().get(i))
    }

    pub fn entity_mut(&mut self) -> Option<&mut EntityDescriptor> {
        self.entity.and_then(|i| self.run.app.entity_mut(i))
    }

    /// Variables as seen by templates right now.
    pub fn render_context(&self) -> RenderContext {
        self.run.render_context(self.entity)
    }

    // ── settings ───────────────────────────────────────────────────────────

    pub fn settings(&self) -> &dyn SettingsStore {
        self.run.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        self.run.settings.as_mut()
    }

    /// Seed settings without clobbering earlier runs' values, then copy the
    /// effective values into the application context (context values that
    /// are already set win).
    pub fn apply_defaults(&mut self, defaults: &ConfigMap) -> Vec<String> {
        let written = self.run.settings.apply_defaults(defaults);
        for key in defaults.keys() {
            if let Some(value) = self.run.settings.get(key) {
                self.run.app.set_default(key.clone(), value);
            }
        }
        written
    }

    // ── input ──────────────────────────────────────────────────────────────

    /// Ask a question. Only legal during Prompting.
    pub fn prompt(&self, question: &Question) -> GantryResult<String> {
        if self.phase != Phase::Prompting {
            return Err(ApplicationError::PromptOutsidePrompting { phase: self.phase }.into());
        }
        self.service.prompter().prompt(question)
    }

    // ── composition ────────────────────────────────────────────────────────

    /// Register another unit for this run. Only legal during Composing.
    ///
    /// The unit joins the plan once the current units finish Composing.
    /// A unit whose name is already registered is ignored.
    pub fn compose(&mut self, unit: GeneratorUnit) -> GantryResult<()> {
        if self.phase != Phase::Composing {
            return Err(ApplicationError::ComposeOutsideComposing { phase: self.phase }.into());
        }
        debug!(by = %self.unit, unit = %unit.name(), "composed unit");
        self.run.composed.push(unit);
        Ok(())
    }

    // ── files ──────────────────────────────────────────────────────────────

    /// Render and write a section outside the unit's declared sections.
    pub fn write_section(&mut self, section: &FileSection) -> GantryResult<WriteOutcome> {
        self.ensure_writing()?;
        let ctx = self.render_context();
        let rendered = self.service.templates().render_section(section, &ctx)?;
        self.commit(rendered)
    }

    /// Write literal content to a path relative to the run's base directory.
    pub fn write_file(
        &mut self,
        path: impl AsRef<Path>,
        content: impl Into<String>,
    ) -> GantryResult<WriteOutcome> {
        self.ensure_writing()?;
        let rendered = RenderedFile {
            path: RelativePath::try_new(path.as_ref())?,
            content: content.into(),
        };
        self.commit(rendered)
    }

    fn ensure_writing(&self) -> GantryResult<()> {
        if !self.phase.writes_files() {
            return Err(ApplicationError::WriteOutsideWritingPhase { phase: self.phase }.into());
        }
        Ok(())
    }

    fn commit(&mut self, rendered: RenderedFile) -> GantryResult<WriteOutcome> {
        let origin = self.run.origin(self.unit, self.phase, self.entity);
        self.run.write(self.service.filesystem(), rendered, origin)
    }

    // ── nested runs ────────────────────────────────────────────────────────

    /// A copy of the current context rooted at `dir` (relative paths are
    /// taken from the current base directory).
    pub fn nested_context(&self, dir: impl AsRef<Path>) -> ApplicationContext {
        let base = self.run.app.base_dir().join(dir);
        self.run.app.derive(base)
    }

    /// Run another blueprint to completion before returning.
    ///
    /// The nested report is attached to this run's report either way; an
    /// aborted nested run returns its error.
    pub fn run_nested(&mut self, blueprint: &str, app: ApplicationContext) -> GantryResult<()> {
        let limit = self.service.options().max_nesting_depth;
        let depth = self.depth + 1;
        if depth > limit {
            return Err(ApplicationError::NestingDepthExceeded { limit }.into());
        }

        let bp = self
            .service
            .catalog()
            .get(blueprint)
            .ok_or_else(|| ApplicationError::UnknownBlueprint(blueprint.to_string()))?;

        let _nested = info_span!("nested", parent = %self.unit, blueprint, depth).entered();
        let report = self.service.run_at_depth(bp, app, depth);
        let result = match report.error() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        };
        self.run.nested.push(report);
        result
    }
}
