//! Implementation of the `gantry list` command.

use serde::Serialize;

use gantry_core::application::BlueprintInfo;

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat},
    commands::Blueprints,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct BlueprintView<'a> {
    name: &'a str,
    description: &'a str,
    roles: &'a [String],
    units: usize,
}

impl<'a> From<&'a BlueprintInfo> for BlueprintView<'a> {
    fn from(info: &'a BlueprintInfo) -> Self {
        Self {
            name: &info.name,
            description: &info.description,
            roles: &info.roles,
            units: info.units,
        }
    }
}

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let blueprints = Blueprints::load(&global, &config, &output)?;
    let infos: Vec<BlueprintInfo> = blueprints.catalog.iter().map(BlueprintInfo::from).collect();

    let format = if output.is_json() { ListFormat::Json } else { args.format };

    match format {
        ListFormat::Table => {
            output.header("Available Blueprints:")?;
            let width = infos.iter().map(|i| i.name.len()).max().unwrap_or(0);
            for info in &infos {
                output.print(&format!(
                    "  {:<width$}  {} ({} unit(s); roles: {})",
                    info.name,
                    info.description,
                    info.units,
                    info.roles.join(", ")
                ))?;
            }
        }

        // JSON and plain names bypass quiet mode: they are meant for pipes.
        ListFormat::Json => {
            let views: Vec<BlueprintView<'_>> = infos.iter().map(BlueprintView::from).collect();
            output.json(&views)?;
        }

        ListFormat::List => {
            for info in &infos {
                println!("{}", info.name);
            }
        }
    }

    Ok(())
}
