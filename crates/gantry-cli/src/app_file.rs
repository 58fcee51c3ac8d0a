//! Application description files and the flags that override them.
//!
//! ```toml
//! name      = "Pet Shop"
//! directory = "shop"            # optional
//!
//! [config]
//! applicationType = "monolith"
//! port            = 8080        # scalars are stored as strings
//!
//! [[entities]]
//! name = "User"
//!
//! [[entities]]
//! name = "OrderLine"
//! config = { table = "order_lines" }
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use gantry_core::domain::{ApplicationContext, ConfigMap, EntityDescriptor};

use crate::{
    cli::GenerateArgs,
    error::{CliError, CliResult, IntoCli},
};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppDescription {
    pub name: Option<String>,
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub config: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityEntry {
    pub name: String,
    #[serde(default)]
    pub config: BTreeMap<String, toml::Value>,
}

impl AppDescription {
    pub fn load(path: &Path) -> CliResult<Self> {
        let raw = fs::read_to_string(path)
            .with_cli_context(|| format!("failed to read '{}'", path.display()))?;
        Self::parse(&raw).map_err(|message| CliError::AppFile {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }
}

/// Build the context for `generate`: the description file first, flags on
/// top.
pub fn build_context(args: &GenerateArgs) -> CliResult<ApplicationContext> {
    let description = match &args.app {
        Some(path) => AppDescription::load(path)?,
        None => AppDescription::default(),
    };
    let origin = args.app.clone().unwrap_or_default();

    let name = args
        .name
        .clone()
        .or(description.name)
        .ok_or_else(|| {
            CliError::invalid_input("an application name is required (--name or `name` in --app)")
        })?;
    let base_dir = args
        .dir
        .clone()
        .or(description.directory)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut app = ApplicationContext::new(name, base_dir);

    for (key, value) in stringify(&origin, description.config)? {
        app.set(key, value);
    }
    for (key, value) in &args.set {
        app.set(key.clone(), value.clone());
    }

    for entry in description.entities {
        let mut entity = EntityDescriptor::new(entry.name);
        for (key, value) in stringify(&origin, entry.config)? {
            entity.set(key, value);
        }
        app.add_entity(entity)?;
    }
    for name in &args.entities {
        app.add_entity(EntityDescriptor::new(name.clone()))?;
    }

    app.validate()?;
    Ok(app)
}

fn stringify(origin: &Path, values: BTreeMap<String, toml::Value>) -> CliResult<ConfigMap> {
    values
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(CliError::AppFile {
                        path: origin.to_path_buf(),
                        message: format!(
                            "'{key}' must be a string, number or boolean, not {}",
                            other.type_str()
                        ),
                    });
                }
            };
            Ok((key, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec!["gantry", "generate", "app"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Generate(args) => args,
            other => panic!("expected Generate, got {other:?}"),
        }
    }

    fn write_app(dir: &Path, body: &str) -> String {
        let path = dir.join("app.toml");
        fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    #[test]
    fn parses_scalars_and_entities() {
        let description = AppDescription::parse(
            r#"
name = "Pet Shop"

[config]
applicationType = "monolith"
port = 8080
secure = true

[[entities]]
name = "User"
config = { table = "users" }
"#,
        )
        .unwrap();
        assert_eq!(description.name.as_deref(), Some("Pet Shop"));
        assert_eq!(description.entities.len(), 1);

        let config = stringify(Path::new("app.toml"), description.config).unwrap();
        assert_eq!(config["port"], "8080");
        assert_eq!(config["secure"], "true");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppDescription::parse("name = \"x\"\ncolour = \"red\"\n").is_err());
    }

    #[test]
    fn nested_tables_in_config_are_rejected() {
        let description = AppDescription::parse("[config.db]\nhost = \"x\"\n").unwrap();
        assert!(matches!(
            stringify(Path::new("app.toml"), description.config),
            Err(CliError::AppFile { .. })
        ));
    }

    #[test]
    fn flags_override_the_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = write_app(
            temp.path(),
            r#"
name = "From File"
directory = "from-file"

[config]
applicationType = "monolith"

[[entities]]
name = "User"
"#,
        );

        let app = build_context(&generate_args(&[
            "--app",
            &file,
            "--name",
            "From Flag",
            "--set",
            "applicationType=microservice",
            "--entity",
            "Order",
        ]))
        .unwrap();

        assert_eq!(app.name(), "From Flag");
        assert_eq!(app.base_dir(), Path::new("from-file"));
        assert_eq!(app.get("applicationType"), Some("microservice"));
        let names: Vec<_> = app.entities().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["User", "Order"]);
    }

    #[test]
    fn name_is_required() {
        assert!(matches!(
            build_context(&generate_args(&[])),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn duplicate_entities_are_rejected() {
        let err = build_context(&generate_args(&["--name", "shop", "-e", "User", "-e", "User"]))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn directory_defaults_to_current() {
        let app = build_context(&generate_args(&["--name", "shop"])).unwrap();
        assert_eq!(app.base_dir(), Path::new("."));
    }
}
