//! Implementation of the `gantry generate` command.
//!
//! Responsibility: turn flags and the description file into an
//! `ApplicationContext`, run the blueprint, and display the report. No
//! business logic lives here.

use serde::Serialize;
use tracing::{info, instrument};

use gantry_core::{
    application::{Resolution, RunReport},
    domain::ApplicationContext,
};

use crate::{
    app_file,
    cli::{GenerateArgs, GlobalArgs},
    commands::{Blueprints, plan},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    prompter,
};

/// Execute the `gantry generate` command.
///
/// 1. Build the application context (file, then flags)
/// 2. Load blueprints and resolve the requested one
/// 3. `--dry-run`: print the plan and stop
/// 4. Confirm unless `--yes`, `--quiet` or no terminal
/// 5. Run and print every written file, nested runs included
#[instrument(skip_all, fields(blueprint = %args.blueprint))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let app = app_file::build_context(&args)?;

    let mut options = config.engine_options();
    if args.lenient {
        options.strict_destinations = false;
    }

    let blueprints = Blueprints::load(&global, &config, &output)?;
    let service = blueprints.into_service(&config, options, prompter::select(args.yes));

    // Resolution errors surface before anything is written.
    let resolution = service.plan(&args.blueprint)?;

    if args.dry_run {
        output.info(&format!(
            "Dry run: would generate '{}' into {}",
            app.name(),
            app.base_dir().display()
        ))?;
        return plan::show(&resolution, &output);
    }

    if !global.quiet && !args.yes && !output.is_json() {
        show_summary(&resolution, &app, &output)?;
        if !prompter::confirm("Generate now?")? {
            return Err(CliError::Cancelled);
        }
    }

    info!(app = app.name(), base_dir = %app.base_dir().display(), "generation started");
    let report = service.generate(&args.blueprint, app);

    if output.is_json() {
        output.json(&ReportView::from(&report))?;
    } else {
        show_report(&report, &output)?;
    }

    if let Some(failure) = report.failure {
        return Err(CliError::aborted(
            failure.error,
            failure.phase,
            failure.unit.as_ref().map(|u| u.as_str()),
        ));
    }

    output.success(&format!(
        "Generated {} file(s) with blueprint '{}'",
        report.total_files(),
        report.blueprint
    ))?;
    Ok(())
}

fn show_summary(
    resolution: &Resolution,
    app: &ApplicationContext,
    output: &OutputManager,
) -> CliResult<()> {
    output.header(&format!("Generating '{}'", app.name()))?;
    output.print(&format!("  Blueprint: {}", resolution.blueprint))?;
    output.print(&format!("  Directory: {}", app.base_dir().display()))?;
    output.print(&format!("  Units:     {}", resolution.plan))?;
    if !app.entities().is_empty() {
        let names: Vec<_> = app.entities().iter().map(|e| e.name()).collect();
        output.print(&format!("  Entities:  {}", names.join(", ")))?;
    }
    Ok(())
}

/// Files of the run and its nested runs, then overrides and conflicts.
fn show_report(report: &RunReport, output: &OutputManager) -> CliResult<()> {
    for file in &report.files {
        let path = report.base_dir.join(file.path.as_path());
        let detail = match &file.entity {
            Some(entity) => format!("{} @ {}, {entity}", file.unit, file.phase),
            None => format!("{} @ {}", file.unit, file.phase),
        };
        output.file(file.outcome.as_str(), &path.display().to_string(), &detail)?;
    }

    for overridden in &report.overridden {
        output.info(&format!(
            "Role '{}': '{}' (priority {}) overridden by '{}'",
            overridden.role, overridden.unit, overridden.priority, overridden.winner
        ))?;
    }

    for conflict in &report.conflicts {
        output.warning(&format!(
            "{} written by {} and then {}",
            report.base_dir.join(conflict.path.as_path()).display(),
            conflict.first,
            conflict.second
        ))?;
    }

    for nested in &report.nested {
        output.info(&format!(
            "Nested blueprint '{}' in {}",
            nested.blueprint,
            nested.base_dir.display()
        ))?;
        show_report(nested, output)?;
    }
    Ok(())
}

// ── JSON view ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ReportView {
    run_id: String,
    blueprint: String,
    base_dir: String,
    completed: bool,
    plan: Vec<String>,
    files: Vec<FileView>,
    overridden: Vec<String>,
    conflicts: Vec<String>,
    nested: Vec<ReportView>,
    error: Option<ErrorView>,
}

#[derive(Debug, Serialize)]
struct FileView {
    path: String,
    unit: String,
    phase: String,
    entity: Option<String>,
    outcome: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorView {
    kind: &'static str,
    message: String,
    phase: Option<String>,
    unit: Option<String>,
}

impl From<&RunReport> for ReportView {
    fn from(report: &RunReport) -> Self {
        Self {
            run_id: report.run_id.to_string(),
            blueprint: report.blueprint.clone(),
            base_dir: report.base_dir.display().to_string(),
            completed: report.is_completed(),
            plan: report.plan.names(),
            files: report
                .files
                .iter()
                .map(|f| FileView {
                    path: report.base_dir.join(f.path.as_path()).display().to_string(),
                    unit: f.unit.to_string(),
                    phase: f.phase.to_string(),
                    entity: f.entity.clone(),
                    outcome: f.outcome.as_str(),
                })
                .collect(),
            overridden: report
                .overridden
                .iter()
                .map(|o| format!("{}:{}", o.role, o.unit))
                .collect(),
            conflicts: report.conflicts.iter().map(|c| c.path.to_string()).collect(),
            nested: report.nested.iter().map(ReportView::from).collect(),
            error: report.failure.as_ref().map(|f| ErrorView {
                kind: f.error.root_cause().kind(),
                message: f.error.to_string(),
                phase: f.phase.map(|p| p.to_string()),
                unit: f.unit.as_ref().map(|u| u.to_string()),
            }),
        }
    }
}
