//! `gantry plan`: resolve a blueprint without running it.

use serde::Serialize;

use gantry_adapters::DefaultsPrompter;
use gantry_core::application::Resolution;

use crate::{
    cli::{GlobalArgs, PlanArgs},
    commands::Blueprints,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: PlanArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let mut options = config.engine_options();
    options.strict_roles |= args.strict_roles;

    let service = Blueprints::load(&global, &config, &output)?.into_service(
        &config,
        options,
        Box::new(DefaultsPrompter),
    );
    let resolution = service.plan(&args.blueprint)?;
    show(&resolution, &output)
}

/// Numbered execution order, then role overrides.
pub fn show(resolution: &Resolution, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        output.json(&PlanView::from(resolution))?;
        return Ok(());
    }

    output.header(&format!("Blueprint '{}'", resolution.blueprint))?;

    for (index, unit) in resolution.units.iter().enumerate() {
        let manifest = unit.manifest();
        let phases: Vec<_> = unit.active_phases().iter().map(|p| p.as_str()).collect();
        output.print(&format!(
            "  {:>2}. {} v{} (priority {}) [{}]",
            index + 1,
            manifest.name(),
            manifest.version(),
            manifest.priority(),
            phases.join(", ")
        ))?;
        if !manifest.dependencies().is_empty() {
            let deps: Vec<_> = manifest.dependencies().iter().map(|d| d.as_str()).collect();
            output.print(&format!("      after: {}", deps.join(", ")))?;
        }
    }

    for overridden in &resolution.overridden {
        output.info(&format!(
            "Role '{}': '{}' (priority {}) overridden by '{}'",
            overridden.role, overridden.unit, overridden.priority, overridden.winner
        ))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PlanView {
    blueprint: String,
    units: Vec<UnitView>,
    overridden: Vec<OverrideView>,
}

#[derive(Debug, Serialize)]
struct UnitView {
    name: String,
    version: String,
    priority: i32,
    dependencies: Vec<String>,
    phases: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct OverrideView {
    role: String,
    unit: String,
    priority: i32,
    winner: String,
}

impl From<&Resolution> for PlanView {
    fn from(resolution: &Resolution) -> Self {
        Self {
            blueprint: resolution.blueprint.clone(),
            units: resolution
                .units
                .iter()
                .map(|unit| {
                    let manifest = unit.manifest();
                    UnitView {
                        name: manifest.name().to_string(),
                        version: manifest.version().to_string(),
                        priority: manifest.priority(),
                        dependencies: manifest.dependencies().iter().map(|d| d.to_string()).collect(),
                        phases: unit.active_phases().iter().map(|p| p.as_str()).collect(),
                    }
                })
                .collect(),
            overridden: resolution
                .overridden
                .iter()
                .map(|o| OverrideView {
                    role: o.role.to_string(),
                    unit: o.unit.to_string(),
                    priority: o.priority,
                    winner: o.winner.to_string(),
                })
                .collect(),
        }
    }
}
