//! The `gantry` binary.
//!
//! `.env`, then arguments, then logging, then configuration (skipped for
//! commands that must work without it), then the command itself. Every
//! failure ends in [`handle_error`], which prints to stderr and picks the
//! exit code:
//!
//! | Code | Meaning                          |
//! |------|----------------------------------|
//! |  0   | Success                          |
//! |  1   | Internal / I/O error             |
//! |  2   | Bad input, composition rejected  |
//! |  3   | Unknown blueprint, role or unit  |
//! |  4   | Configuration error              |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands, ConfigCommands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod app_file;
mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod prompter;

fn main() -> ExitCode {
    // Before tracing init, so RUST_LOG and GANTRY_* can come from .env.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here as well and are not failures.
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 2 } else { 0 });
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("gantry: {e:#}");
        return ExitCode::from(1);
    }
    debug!(command = ?cli.command, "parsed arguments");

    let verbose = cli.global.verbose > 0;
    let config = if needs_config(&cli.command) {
        match AppConfig::load(cli.global.config.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                let err = CliError::ConfigError {
                    message: format!("{e:#}"),
                    source: Some(e.into()),
                };
                return handle_error(err, verbose, !cli.global.no_color);
            }
        }
    } else {
        AppConfig::default()
    };

    let color = !cli.global.no_color && !config.output.no_color;
    let output = OutputManager::new(&cli.global, &config);
    match run(cli, config, output) {
        Ok(()) => {
            info!("done");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose, color),
    }
}

/// `init`, `completions` and `config path` must work without a readable
/// config file.
fn needs_config(command: &Commands) -> bool {
    !matches!(
        command,
        Commands::Init(_) | Commands::Completions(_) | Commands::Config(ConfigCommands::Path)
    )
}

#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Generate(cmd) => commands::generate::execute(cmd, cli.global, config, output),
        Commands::Plan(cmd) => commands::plan::execute(cmd, cli.global, config, output),
        Commands::List(cmd) => commands::list::execute(cmd, cli.global, config, output),
        Commands::Init(cmd) => commands::init::execute(cmd, cli.global, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global, config, output),
    }
}

fn handle_error(err: CliError, verbose: bool, color: bool) -> ExitCode {
    err.log();
    let color = color && std::io::stderr().is_terminal();
    eprint!("{}", err.render(verbose, color));
    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_version_matches_cargo() {
        assert_eq!(Cli::command().get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn config_free_commands() {
        for argv in [
            &["gantry", "init"][..],
            &["gantry", "config", "path"],
            &["gantry", "completions", "bash"],
        ] {
            assert!(!needs_config(&Cli::parse_from(argv).command), "{argv:?}");
        }
    }

    #[test]
    fn running_commands_load_config() {
        for argv in [
            &["gantry", "list"][..],
            &["gantry", "plan"],
            &["gantry", "config", "list"],
        ] {
            assert!(needs_config(&Cli::parse_from(argv).command), "{argv:?}");
        }
    }
}
