//! `gantry config`: inspect the effective configuration.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            println!("{value}");
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
            } else {
                output.header("Current Configuration:")?;
                let serialised = config.to_toml().with_cli_context(|| "listing configuration")?;
                output.print(serialised.trim_end())?;
            }
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::active_path(global.config.as_ref()).display());
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

/// Scalars print bare; tables and arrays print as TOML.
fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let value = config
        .get(key)
        .with_cli_context(|| format!("reading '{key}'"))?
        .ok_or_else(|| CliError::config(format!("Unknown config key: '{key}'")))?;

    Ok(match value {
        toml::Value::String(s) => s,
        toml::Value::Table(table) => toml::to_string_pretty(&table)
            .map_err(|e| CliError::config(e.to_string()))?
            .trim_end()
            .to_string(),
        other => other.to_string(),
    })
}

// ── tests ─────────────────────────────────────────────────────────────────────
