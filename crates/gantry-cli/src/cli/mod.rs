//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "gantry",
    bin_name = "gantry",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Composable, phase-driven project generation",
    long_about = "Gantry composes generator units into blueprints and runs them \
                  through a fixed sequence of phases to produce a project tree.",
    after_help = "EXAMPLES:\n\
        \x20 gantry generate app --name \"Pet Shop\" --entity User --entity Order\n\
        \x20 gantry generate app --app shop.toml --set applicationType=microservice\n\
        \x20 gantry plan app\n\
        \x20 gantry list --format json\n\
        \x20 gantry completions bash > /usr/share/bash-completion/completions/gantry",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a blueprint against an application description.
    #[command(
        visible_alias = "g",
        about = "Generate a project from a blueprint",
        after_help = "EXAMPLES:\n\
            \x20 gantry generate app --name shop --entity User\n\
            \x20 gantry generate app --app shop.toml --dir ./shop --yes\n\
            \x20 gantry generate app --name shop --set flutterDir=mobile --dry-run"
    )]
    Generate(GenerateArgs),

    /// Show the resolved execution order of a blueprint.
    #[command(
        about = "Show the resolved unit order of a blueprint",
        after_help = "EXAMPLES:\n\
            \x20 gantry plan app\n\
            \x20 gantry plan flutter --strict-roles"
    )]
    Plan(PlanArgs),

    /// List available blueprints.
    #[command(
        visible_alias = "ls",
        about = "List available blueprints",
        after_help = "EXAMPLES:\n\
            \x20 gantry list\n\
            \x20 gantry list --format json\n\
            \x20 gantry list -B ./my-blueprints"
    )]
    List(ListArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 gantry init                    # platform config dir\n\
            \x20 gantry init -c ./gantry.toml   # explicit location\n\
            \x20 gantry init --force            # overwrite"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 gantry completions bash > ~/.local/share/bash-completion/completions/gantry\n\
            \x20 gantry completions zsh  > ~/.zfunc/_gantry\n\
            \x20 gantry completions fish > ~/.config/fish/completions/gantry.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Gantry configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 gantry config get engine.max_nesting_depth\n\
            \x20 gantry config list\n\
            \x20 gantry config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `gantry generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Blueprint to run.
    #[arg(value_name = "BLUEPRINT", default_value = "app", help = "Blueprint name")]
    pub blueprint: String,

    /// Application description file (TOML).
    #[arg(
        short = 'a',
        long = "app",
        value_name = "FILE",
        help = "Application description file (TOML)"
    )]
    pub app: Option<PathBuf>,

    /// Application name; overrides the description file.
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Application name")]
    pub name: Option<String>,

    /// Entity to generate per-entity files for.
    #[arg(
        short = 'e',
        long = "entity",
        value_name = "NAME",
        action = clap::ArgAction::Append,
        help = "Entity name (repeatable)"
    )]
    pub entities: Vec<String>,

    /// Context value, `KEY=VALUE`.
    #[arg(
        short = 's',
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = parse_assignment,
        action = clap::ArgAction::Append,
        help = "Set an application config value (repeatable)"
    )]
    pub set: Vec<(String, String)>,

    /// Target directory.
    #[arg(
        short = 'd',
        long = "dir",
        value_name = "DIR",
        help = "Target directory (default: current directory)"
    )]
    pub dir: Option<PathBuf>,

    /// Skip the confirmation prompt and take question defaults.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Skip confirmation and accept prompt defaults"
    )]
    pub yes: bool,

    /// Report destination conflicts instead of aborting.
    #[arg(long = "lenient", help = "Let later writes win on destination conflicts")]
    pub lenient: bool,

    /// Print the plan without running any phase.
    #[arg(long = "dry-run", help = "Show the plan without generating")]
    pub dry_run: bool,
}

/// Parse a `KEY=VALUE` pair.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ── plan ──────────────────────────────────────────────────────────────────────

/// Arguments for `gantry plan`.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Blueprint to resolve.
    #[arg(value_name = "BLUEPRINT", default_value = "app", help = "Blueprint name")]
    pub blueprint: String,

    /// Treat equal-priority role registrations as a conflict.
    #[arg(long = "strict-roles", help = "Fail on equal-priority role registrations")]
    pub strict_roles: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `gantry list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `gantry init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `gantry completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `gantry config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `engine.strict_roles`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "gantry", "generate", "app", "--name", "shop", "-e", "User", "-e", "Order",
            "--set", "flutterDir=mobile",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.blueprint, "app");
        assert_eq!(args.name.as_deref(), Some("shop"));
        assert_eq!(args.entities, ["User", "Order"]);
        assert_eq!(args.set, [("flutterDir".to_string(), "mobile".to_string())]);
        assert!(!args.dry_run);
    }

    #[test]
    fn generate_defaults_to_app_blueprint() {
        let cli = Cli::parse_from(["gantry", "g", "--name", "shop"]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.blueprint, "app");
    }

    #[test]
    fn assignment_keeps_equals_in_value() {
        assert_eq!(
            parse_assignment("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
    }

    #[test]
    fn assignment_requires_key_and_equals() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn blueprint_dirs_are_global_and_repeatable() {
        let cli = Cli::parse_from(["gantry", "list", "-B", "a", "--blueprints", "b"]);
        assert_eq!(cli.global.blueprints, [PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["gantry", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }
}
