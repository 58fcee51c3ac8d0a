//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only ever sees the
//! [`EngineOptions`] derived from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `GANTRY_`-prefixed environment variables, `__` between sections:
//!    `GANTRY_ENGINE__STRICT_ROLES=true`
//! 3. Config file (`--config`, else the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gantry_adapters::default_search_path;
use gantry_core::application::EngineOptions;

const ENV_PREFIX: &str = "GANTRY";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine behaviour.
    pub engine: EngineConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Where declarative blueprints are looked for.
    pub blueprints: BlueprintConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strict_destinations: bool,
    pub strict_roles: bool,
    /// Fail on placeholders with no value instead of leaving them in place.
    pub strict_templates: bool,
    pub max_composition_depth: usize,
    pub max_nesting_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--output-format` overrides it.
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintConfig {
    /// Replaces the default search path when non-empty.
    pub search_path: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let engine = EngineOptions::default();
        Self {
            strict_destinations: engine.strict_destinations,
            strict_roles: engine.strict_roles,
            strict_templates: false,
            max_composition_depth: engine.max_composition_depth,
            max_nesting_depth: engine.max_nesting_depth,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            output: OutputConfig::default(),
            blueprints: BlueprintConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the process
    /// environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        Self::load_with(config_file, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("blueprints.search_path")
    }

    fn load_with(config_file: Option<&PathBuf>, env: Environment) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        let defaults = Config::try_from(&Self::default()).context("invalid built-in defaults")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(required))
            .add_source(env)
            .build()
            .with_context(|| format!("failed to read configuration from '{}'", path.display()))?;

        config
            .try_deserialize()
            .with_context(|| format!("invalid configuration in '{}'", path.display()))
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `gantry.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "gantry", "gantry")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("gantry.toml"))
    }

    /// The file `init` writes and `config path` reports.
    pub fn active_path(config_file: Option<&PathBuf>) -> PathBuf {
        config_file.cloned().unwrap_or_else(Self::config_path)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            strict_destinations: self.engine.strict_destinations,
            strict_roles: self.engine.strict_roles,
            max_composition_depth: self.engine.max_composition_depth,
            max_nesting_depth: self.engine.max_nesting_depth,
        }
    }

    /// `extra` first, then the configured path (or the built-in default).
    pub fn search_path(&self, extra: &[PathBuf]) -> Vec<PathBuf> {
        let configured = if self.blueprints.search_path.is_empty() {
            default_search_path()
        } else {
            self.blueprints.search_path.clone()
        };
        extra.iter().cloned().chain(configured).collect()
    }

    /// Look up a dotted key, e.g. `engine.max_nesting_depth`.
    pub fn get(&self, key: &str) -> anyhow::Result<Option<toml::Value>> {
        let mut value = toml::Value::try_from(self).context("failed to serialise configuration")?;
        for part in key.split('.') {
            match value {
                toml::Value::Table(mut table) => match table.remove(part) {
                    Some(next) => value = next,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialise configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::environment().source(Some(map))
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.engine_options(), EngineOptions::default());
        assert!(!cfg.engine.strict_templates);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn explicit_file_must_exist() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(AppConfig::load_with(Some(&missing), env(&[])).is_err());
    }

    #[test]
    fn file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[engine]\nstrict_roles = true\nmax_nesting_depth = 2\n\n[blueprints]\nsearch_path = [\"bp\"]\n",
        )
        .unwrap();

        let cfg = AppConfig::load_with(Some(&path), env(&[])).unwrap();
        assert!(cfg.engine.strict_roles);
        assert_eq!(cfg.engine.max_nesting_depth, 2);
        // Untouched keys keep their defaults.
        assert!(cfg.engine.strict_destinations);
        assert_eq!(cfg.blueprints.search_path, [PathBuf::from("bp")]);
    }

    #[test]
    fn environment_overrides_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[engine]\nstrict_destinations = true\n").unwrap();

        let cfg = AppConfig::load_with(
            Some(&path),
            env(&[
                ("GANTRY_ENGINE__STRICT_DESTINATIONS", "false"),
                ("GANTRY_ENGINE__MAX_COMPOSITION_DEPTH", "3"),
            ]),
        )
        .unwrap();
        assert!(!cfg.engine.strict_destinations);
        assert_eq!(cfg.engine.max_composition_depth, 3);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[engine\nstrict_roles = ").unwrap();
        assert!(AppConfig::load_with(Some(&path), env(&[])).is_err());
    }

    #[test]
    fn dotted_get() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.get("engine.max_nesting_depth").unwrap(),
            Some(toml::Value::Integer(4))
        );
        assert_eq!(
            cfg.get("output.format").unwrap(),
            Some(toml::Value::String("auto".into()))
        );
        assert!(cfg.get("engine.nope").unwrap().is_none());
        assert!(cfg.get("output.format.deeper").unwrap().is_none());
    }

    #[test]
    fn extra_blueprint_dirs_come_first() {
        let mut cfg = AppConfig::default();
        cfg.blueprints.search_path = vec![PathBuf::from("configured")];
        assert_eq!(
            cfg.search_path(&[PathBuf::from("flag")]),
            [PathBuf::from("flag"), PathBuf::from("configured")]
        );
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = AppConfig::default();
        let parsed: AppConfig = toml::from_str(&cfg.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, cfg);
    }
}
