//! Generation Service - main application orchestrator.
//!
//! 1. Validate the application context
//! 2. Resolve roles (blueprint registry) and order units (composition resolver)
//! 3. Open the settings session
//! 4. Hand everything to the phase scheduler
//!
//! Resolution errors abort the run before any file or settings I/O.

use tracing::{info_span, instrument};

use crate::{
    application::{
        ApplicationError,
        blueprint::{Blueprint, BlueprintCatalog, BlueprintInfo},
        ports::{Filesystem, Prompter, SettingsBackend},
        services::{
            scheduler::{OverriddenRole, PhaseScheduler, RunReport, RunState},
            template_service::TemplateService,
        },
        unit::GeneratorUnit,
    },
    domain::{
        ApplicationContext, CompositionResolver, ConflictPolicy, DomainValidator as validator, ExecutionPlan,
        UnitManifest,
    },
    error::GantryResult,
};

/// Engine knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Abort on two sections resolving to the same destination.
    pub strict_destinations: bool,
    /// Treat equal-priority role registrations as a conflict.
    pub strict_roles: bool,
    /// Additional resolution passes allowed during Composing.
    pub max_composition_depth: usize,
    /// Maximum depth of nested runs.
    pub max_nesting_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict_destinations: true,
            strict_roles: false,
            max_composition_depth: 1,
            max_nesting_depth: 4,
        }
    }
}

impl EngineOptions {
    pub fn conflict_policy(&self) -> ConflictPolicy {
        if self.strict_destinations {
            ConflictPolicy::Strict
        } else {
            ConflictPolicy::LastWriterWins
        }
    }
}

/// Output of role and dependency resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub blueprint: String,
    pub plan: ExecutionPlan,
    /// Winning units, in plan order.
    pub units: Vec<GeneratorUnit>,
    pub overridden: Vec<OverriddenRole>,
}

/// Main generation service.
pub struct GenerationService {
    filesystem: Box<dyn Filesystem>,
    settings: Box<dyn SettingsBackend>,
    templates: TemplateService,
    prompter: Box<dyn Prompter>,
    catalog: BlueprintCatalog,
    options: EngineOptions,
}

impl GenerationService {
    /// Create a new generation service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let service = GenerationService::new(
    ///     Box::new(LocalFilesystem::new()),
    ///     Box::new(TomlSettingsBackend::new()),
    ///     TemplateService::new(Box::new(templates), Box::new(SimpleRenderer::new())),
    ///     Box::new(DefaultsPrompter),
    /// )
    /// .with_catalog(builtin_catalog());
    /// ```
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        settings: Box<dyn SettingsBackend>,
        templates: TemplateService,
        prompter: Box<dyn Prompter>,
    ) -> Self {
        Self {
            filesystem,
            settings,
            templates,
            prompter,
            catalog: BlueprintCatalog::new(),
            options: EngineOptions::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: BlueprintCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &BlueprintCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub(crate) fn filesystem(&self) -> &dyn Filesystem {
        self.filesystem.as_ref()
    }

    pub(crate) fn templates(&self) -> &TemplateService {
        &self.templates
    }

    pub(crate) fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }

    /// All blueprints, sorted by name.
    pub fn list_blueprints(&self) -> Vec<BlueprintInfo> {
        self.catalog.iter().map(BlueprintInfo::from).collect()
    }

    pub fn blueprint(&self, name: &str) -> GantryResult<&Blueprint> {
        self.catalog
            .get(name)
            .ok_or_else(|| ApplicationError::UnknownBlueprint(name.to_string()).into())
    }

    /// Resolve roles, then order the winning units.
    #[instrument(skip_all, fields(blueprint = %blueprint.name()))]
    pub fn resolve(&self, blueprint: &Blueprint) -> GantryResult<Resolution> {
        let resolved = blueprint.registry(self.options.strict_roles).resolve()?;

        let overridden = resolved
            .overridden
            .iter()
            .map(|o| OverriddenRole {
                role: o.binding.role.clone(),
                unit: o.binding.unit.name().clone(),
                priority: o.binding.priority,
                winner: o.winner.clone(),
            })
            .collect();

        let units = resolved.into_units();
        let manifests: Vec<UnitManifest> = units.iter().map(|u| u.manifest().clone()).collect();
        let plan = CompositionResolver::resolve(&manifests)?;

        let mut units = units;
        units.sort_by_key(|u| plan.position(u.name().as_str()).unwrap_or(usize::MAX));

        Ok(Resolution {
            blueprint: blueprint.name().to_string(),
            plan,
            units,
            overridden,
        })
    }

    /// Resolve a catalog blueprint by name without running it.
    pub fn plan(&self, blueprint: &str) -> GantryResult<Resolution> {
        self.resolve(self.blueprint(blueprint)?)
    }

    /// Run a catalog blueprint.
    ///
    /// Never returns `Err`: failures are recorded in the report, whose
    /// `into_result` gives the triggering error.
    pub fn generate(&self, blueprint: &str, app: ApplicationContext) -> RunReport {
        match self.catalog.get(blueprint) {
            Some(bp) => self.run_blueprint(bp, app),
            None => {
                let mut report = RunReport::new(blueprint, app.base_dir().to_path_buf(), 0);
                report.transition(RunState::Resolving);
                report.abort(
                    ApplicationError::UnknownBlueprint(blueprint.to_string()).into(),
                    None,
                    None,
                )
            }
        }
    }

    /// Run any blueprint, catalog or not.
    pub fn run_blueprint(
        &self,
        blueprint: &Blueprint,
        app: ApplicationContext,
    ) -> RunReport {
        self.run_at_depth(blueprint, app, 0)
    }

    pub(crate) fn run_at_depth(
        &self,
        blueprint: &Blueprint,
        app: ApplicationContext,
        depth: usize,
    ) -> RunReport {
        let mut report = RunReport::new(blueprint.name(), app.base_dir().to_path_buf(), depth);
        let _run = info_span!(
            "run",
            run_id = %report.run_id,
            blueprint = %blueprint.name(),
            depth
        )
        .entered();

        report.transition(RunState::Resolving);
        if let Err(e) = validator::validate_context(&app) {
            return report.abort(e.into(), None, None);
        }

        let resolution = match self.resolve(blueprint) {
            Ok(r) => r,
            Err(e) => return report.abort(e, None, None),
        };
        report.plan = resolution.plan.clone();
        report.overridden = resolution.overridden;

        let settings = match self.settings.open(app.base_dir()) {
            Ok(s) => s,
            Err(e) => return report.abort(e, None, None),
        };

        PhaseScheduler::new(self, depth).run(resolution.plan, resolution.units, app, settings, report)
    }
}
