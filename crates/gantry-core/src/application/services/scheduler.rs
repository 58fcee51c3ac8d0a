//! Phase scheduler - drives one run through the fixed phase sequence.
//!
//! ```text
//! Pending ─▶ Resolving ─▶ Running(Initializing) ─▶ … ─▶ Running(End) ─▶ Completed
//!               │                 │                          │
//!               └────────────┬────┴──────────────────────────┘
//!                            ▼
//!                         Aborted
//! ```
//!
//! Units run strictly one at a time in plan order. Every unit finishes a
//! phase before the next phase starts. `WritingEntities` repeats the whole
//! unit pass once per entity, in entity-list order.

use std::fmt;
use std::mem;
use std::path::PathBuf;

use tracing::{debug, debug_span, info, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, SettingsStore, WriteOutcome},
        services::generation_service::GenerationService,
        task::TaskContext,
        unit::GeneratorUnit,
    },
    domain::{
        ApplicationContext, CompositionResolver, DestinationConflict, ExecutionPlan, Phase,
        PhaseScope, RelativePath, RenderContext, RenderedFile, RoleName, UnitManifest, UnitName,
        WriteLedger, WriteOrigin,
    },
    error::{GantryError, GantryResult},
};

// ============================================================================
// Run report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Resolving,
    Running(Phase),
    Completed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Resolving => f.write_str("resolving"),
            Self::Running(phase) => write!(f, "running ({phase})"),
            Self::Completed => f.write_str("completed"),
            Self::Aborted => f.write_str("aborted"),
        }
    }
}

/// One file handed to the filesystem during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: RelativePath,
    pub unit: UnitName,
    pub phase: Phase,
    pub entity: Option<String>,
    pub outcome: WriteOutcome,
}

/// A role binding that lost to a higher-priority registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverriddenRole {
    pub role: RoleName,
    pub unit: UnitName,
    pub priority: i32,
    pub winner: UnitName,
}

/// Why and where a run stopped.
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub error: GantryError,
    /// `None` when the run never reached a phase (resolution failures).
    pub phase: Option<Phase>,
    pub unit: Option<UnitName>,
}

/// Everything observable about a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub blueprint: String,
    pub base_dir: PathBuf,
    pub depth: usize,
    pub state: RunState,
    pub completed_phases: Vec<Phase>,
    pub plan: ExecutionPlan,
    pub overridden: Vec<OverriddenRole>,
    pub files: Vec<WrittenFile>,
    pub conflicts: Vec<DestinationConflict>,
    pub nested: Vec<RunReport>,
    /// Final application context, once the run got past resolution.
    pub context: Option<ApplicationContext>,
    pub failure: Option<RunFailure>,
}

impl RunReport {
    pub(crate) fn new(blueprint: &str, base_dir: PathBuf, depth: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            blueprint: blueprint.to_string(),
            base_dir,
            depth,
            state: RunState::Pending,
            completed_phases: Vec::new(),
            plan: ExecutionPlan::default(),
            overridden: Vec::new(),
            files: Vec::new(),
            conflicts: Vec::new(),
            nested: Vec::new(),
            context: None,
            failure: None,
        }
    }

    pub(crate) fn transition(&mut self, next: RunState) {
        debug!(run_id = %self.run_id, from = %self.state, to = %next, "run state");
        self.state = next;
    }

    pub(crate) fn abort(
        mut self,
        error: GantryError,
        phase: Option<Phase>,
        unit: Option<UnitName>,
    ) -> Self {
        self.fail(error, phase, unit);
        self
    }

    fn fail(&mut self, error: GantryError, phase: Option<Phase>, unit: Option<UnitName>) {
        warn!(
            run_id = %self.run_id,
            kind = error.kind(),
            phase = ?phase,
            unit = ?unit.as_ref().map(UnitName::as_str),
            error = %error,
            "run aborted"
        );
        self.transition(RunState::Aborted);
        self.failure = Some(RunFailure { error, phase, unit });
    }

    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn error(&self) -> Option<&GantryError> {
        self.failure.as_ref().map(|f| &f.error)
    }

    /// `Ok(self)` when completed, the triggering error otherwise.
    pub fn into_result(self) -> GantryResult<Self> {
        match self.failure {
            Some(failure) => Err(failure.error),
            None => Ok(self),
        }
    }

    /// Files written by this run and every nested run.
    pub fn total_files(&self) -> usize {
        self.files.len() + self.nested.iter().map(RunReport::total_files).sum::<usize>()
    }
}

// ============================================================================
// Active run state
// ============================================================================

/// Mutable state of a run, lent to one task at a time.
pub(crate) struct ActiveRun {
    pub(crate) app: ApplicationContext,
    pub(crate) settings: Box<dyn SettingsStore>,
    pub(crate) ledger: WriteLedger,
    pub(crate) files: Vec<WrittenFile>,
    pub(crate) composed: Vec<GeneratorUnit>,
    pub(crate) nested: Vec<RunReport>,
}

impl ActiveRun {
    pub(crate) fn render_context(&self, entity: Option<usize>) -> RenderContext {
        match entity.and_then(|i| self.app.entities().get(i)) {
            Some(e) => RenderContext::for_entity(&self.app, e),
            None => RenderContext::for_application(&self.app),
        }
    }

    pub(crate) fn origin(&self, unit: &UnitName, phase: Phase, entity: Option<usize>) -> WriteOrigin {
        WriteOrigin {
            unit: unit.clone(),
            phase,
            entity: entity
                .and_then(|i| self.app.entities().get(i))
                .map(|e| e.name().to_string()),
        }
    }

    /// Claim the destination, then write it below the run's base directory.
    pub(crate) fn write(
        &mut self,
        fs: &dyn Filesystem,
        rendered: RenderedFile,
        origin: WriteOrigin,
    ) -> GantryResult<WriteOutcome> {
        let reported = self.ledger.conflicts().len();
        self.ledger.claim(&rendered.path, origin.clone())?;
        if let Some(conflict) = self.ledger.conflicts().get(reported) {
            warn!(
                path = %conflict.path,
                first = %conflict.first,
                second = %conflict.second,
                "destination written twice, last writer wins"
            );
        }

        let target = self.app.base_dir().join(rendered.path.as_path());
        let outcome = fs.write_file(&target, &rendered.content)?;
        debug!(path = %rendered.path, outcome = outcome.as_str(), "wrote file");

        self.files.push(WrittenFile {
            path: rendered.path,
            unit: origin.unit,
            phase: origin.phase,
            entity: origin.entity,
            outcome,
        });
        Ok(outcome)
    }
}

struct Abort {
    error: GantryError,
    phase: Phase,
    unit: Option<UnitName>,
}

impl Abort {
    fn new(error: impl Into<GantryError>, phase: Phase, unit: Option<&UnitName>) -> Self {
        Self {
            error: error.into(),
            phase,
            unit: unit.cloned(),
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

pub struct PhaseScheduler<'s> {
    service: &'s GenerationService,
    depth: usize,
}

impl<'s> PhaseScheduler<'s> {
    pub fn new(service: &'s GenerationService, depth: usize) -> Self {
        Self { service, depth }
    }

    /// Run every phase over `units` in `plan` order.
    ///
    /// The settings session is flushed when the run ends, completed or not.
    /// Files written before an abort stay on disk.
    pub fn run(
        &self,
        plan: ExecutionPlan,
        units: Vec<GeneratorUnit>,
        app: ApplicationContext,
        settings: Box<dyn SettingsStore>,
        mut report: RunReport,
    ) -> RunReport {
        let mut run = ActiveRun {
            app,
            settings,
            ledger: WriteLedger::new(self.service.options().conflict_policy()),
            files: Vec::new(),
            composed: Vec::new(),
            nested: Vec::new(),
        };
        let mut plan = plan;
        let mut units = order_units(units, &plan);

        let result = self.drive(&mut plan, &mut units, &mut run, &mut report);
        let flushed = run.settings.flush();

        report.plan = plan;
        report.files = mem::take(&mut run.files);
        report.conflicts = run.ledger.conflicts().to_vec();
        report.nested = mem::take(&mut run.nested);
        report.context = Some(run.app);

        match (result, flushed) {
            (Ok(()), Ok(())) => {
                report.transition(RunState::Completed);
                info!(
                    run_id = %report.run_id,
                    blueprint = %report.blueprint,
                    files = report.files.len(),
                    conflicts = report.conflicts.len(),
                    "run completed"
                );
            }
            (Ok(()), Err(e)) => report.fail(e, None, None),
            (Err(abort), flushed) => {
                if let Err(e) = flushed {
                    warn!(error = %e, "failed to flush settings after abort");
                }
                report.fail(abort.error, Some(abort.phase), abort.unit);
            }
        }
        report
    }

    fn drive(
        &self,
        plan: &mut ExecutionPlan,
        units: &mut Vec<GeneratorUnit>,
        run: &mut ActiveRun,
        report: &mut RunReport,
    ) -> Result<(), Abort> {
        for phase in Phase::ALL {
            report.transition(RunState::Running(phase));
            let _phase = debug_span!("phase", %phase).entered();

            match phase.scope() {
                PhaseScope::Application => {
                    for unit in units.iter() {
                        self.run_unit(run, unit, phase, None)
                            .map_err(|e| Abort::new(e, phase, Some(unit.name())))?;
                    }
                }
                PhaseScope::Entity => {
                    let count = run.app.entities().len();
                    for idx in 0..count {
                        if idx >= run.app.entities().len() {
                            break;
                        }
                        for unit in units.iter() {
                            self.run_unit(run, unit, phase, Some(idx))
                                .map_err(|e| Abort::new(e, phase, Some(unit.name())))?;
                        }
                    }
                }
            }

            if phase == Phase::Composing {
                self.compose_pending(plan, units, run)?;
            }

            report.completed_phases.push(phase);
        }
        Ok(())
    }

    /// Tasks first, then (in writing phases) the unit's file sections.
    fn run_unit(
        &self,
        run: &mut ActiveRun,
        unit: &GeneratorUnit,
        phase: Phase,
        entity: Option<usize>,
    ) -> GantryResult<()> {
        for task in unit.tasks(phase) {
            debug!(unit = %unit.name(), task = task.name(), entity = ?entity, "running task");
            let mut ctx = TaskContext::new(self.service, self.depth, phase, unit.name(), entity, run);
            task.call(&mut ctx)
                .map_err(|source| ApplicationError::PhaseCallback {
                    unit: unit.name().to_string(),
                    phase,
                    task: task.name().to_string(),
                    source: Box::new(source),
                })?;
        }

        if phase.writes_files() {
            for section in unit.sections(phase) {
                let ctx = run.render_context(entity);
                let rendered = self.service.templates().render_section(section, &ctx)?;
                let origin = run.origin(unit.name(), phase, entity);
                run.write(self.service.filesystem(), rendered, origin)?;
            }
        }
        Ok(())
    }

    /// Fold units registered during Composing into the plan.
    ///
    /// Each pass re-resolves (appending, never reordering) and runs the
    /// newcomers' own Composing tasks, which may compose again. Passes are
    /// capped by `max_composition_depth`. Composed units join from Composing
    /// on; earlier phases are not replayed for them.
    fn compose_pending(
        &self,
        plan: &mut ExecutionPlan,
        units: &mut Vec<GeneratorUnit>,
        run: &mut ActiveRun,
    ) -> Result<(), Abort> {
        let limit = self.service.options().max_composition_depth;
        let mut pass = 0;

        loop {
            let mut fresh: Vec<GeneratorUnit> = Vec::new();
            for unit in mem::take(&mut run.composed) {
                let known = units.iter().chain(fresh.iter()).any(|u| u.name() == unit.name());
                if known {
                    debug!(unit = %unit.name(), "ignoring already registered composed unit");
                    continue;
                }
                fresh.push(unit);
            }

            if fresh.is_empty() {
                return Ok(());
            }

            pass += 1;
            if pass > limit {
                return Err(Abort::new(
                    ApplicationError::CompositionDepthExceeded { limit },
                    Phase::Composing,
                    None,
                ));
            }

            let start = units.len();
            debug!(pass, count = fresh.len(), "re-resolving with composed units");
            units.extend(fresh);

            let manifests: Vec<UnitManifest> = units.iter().map(|u| u.manifest().clone()).collect();
            *plan = CompositionResolver::extend(plan, &manifests)
                .map_err(|e| Abort::new(e, Phase::Composing, None))?;
            *units = order_units(mem::take(units), plan);

            for unit in &units[start..] {
                self.run_unit(run, unit, Phase::Composing, None)
                    .map_err(|e| Abort::new(e, Phase::Composing, Some(unit.name())))?;
            }
        }
    }
}

fn order_units(mut units: Vec<GeneratorUnit>, plan: &ExecutionPlan) -> Vec<GeneratorUnit> {
    units.sort_by_key(|u| plan.position(u.name().as_str()).unwrap_or(usize::MAX));
    units
}
