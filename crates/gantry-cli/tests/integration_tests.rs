//! Integration tests for the `gantry` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `gantry` command isolated from the host: its own cwd, config dir and
/// no colour.
fn gantry(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("xdg"))
        .env("HOME", temp.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("GANTRY_BLUEPRINTS_DIR");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const DOCS_BLUEPRINT: &str = r#"
[blueprint]
name = "docs"
description = "Project documentation"

[[units]]
name = "readme"

[units.defaults]
license = "MIT"

[[units.sections]]
phase = "writing"
template = "README.md"

[[units]]
name = "entity-docs"
depends_on = ["readme"]

[[units.sections]]
phase = "writing-entities"
template = "entity.md"
destination = "docs/{{ENTITY_NAME_KEBAB}}.md"
"#;

fn docs_blueprint(root: &Path) {
    write(root, "bp/docs/blueprint.toml", DOCS_BLUEPRINT);
    write(root, "bp/docs/README.md", "# {{APP_NAME}}\nLicense: {{license}}\n");
    write(root, "bp/docs/entity.md", "# {{ENTITY_NAME}}\n");
}

// ── basics ────────────────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completions_mention_binary() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gantry"));
}

#[test]
fn no_color_accepts_conventional_values() {
    let temp = TempDir::new().unwrap();
    for value in ["1", "true", "yes", "0", ""] {
        gantry(&temp)
            .env("NO_COLOR", value)
            .args(["list", "--format", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("flutter"));
    }
}

// ── list / plan ───────────────────────────────────────────────────────────────

#[test]
fn list_shows_builtin_and_declarative_blueprints() {
    let temp = TempDir::new().unwrap();
    docs_blueprint(temp.path());

    gantry(&temp)
        .args(["-B", "bp", "list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app"))
        .stdout(predicate::str::contains("flutter"))
        .stdout(predicate::str::contains("docs"));
}

#[test]
fn list_json_is_parseable() {
    let temp = TempDir::new().unwrap();
    let out = gantry(&temp)
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["app", "flutter"]);
}

#[test]
fn plan_shows_winner_and_override() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args(["plan", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flutter-app"))
        .stdout(predicate::str::contains("overridden by 'flutter-app'"));
}

#[test]
fn plan_orders_declarative_dependencies() {
    let temp = TempDir::new().unwrap();
    docs_blueprint(temp.path());

    let out = gantry(&temp)
        .args(["-B", "bp", "--output-format", "json", "plan", "docs"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let units: Vec<&str> = parsed["units"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(units, ["readme", "entity-docs"]);
}

// ── generate ──────────────────────────────────────────────────────────────────

#[test]
fn generate_flutter_client_into_requested_directory() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args([
            "generate", "app", "--name", "Pet Shop", "--entity", "User", "--entity", "OrderLine",
            "--set", "flutterDir=mobile", "--dir", "out", "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("pubspec.yaml"));

    let out = temp.path().join("out");
    let pubspec = fs::read_to_string(out.join("mobile/pubspec.yaml")).unwrap();
    assert!(pubspec.starts_with("name: pet_shop"));
    assert!(out.join("mobile/lib/entities/user.dart").is_file());
    assert!(out.join("mobile/lib/entities/order_line.dart").is_file());
    // The README unit lost the `app` role.
    assert!(!out.join("README.md").exists());

    let settings = fs::read_to_string(out.join(".gantry.toml")).unwrap();
    assert!(settings.contains("flutterDir"));
    assert!(settings.contains("mobile"));
}

#[test]
fn generate_defaults_flutter_dir_without_terminal() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args(["generate", "--name", "shop", "--dir", "out"])
        .assert()
        .success();
    assert!(temp.path().join("out/flutter/lib/main.dart").is_file());
}

#[test]
fn microservices_get_no_client() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args([
            "generate", "app", "--name", "svc", "--set", "applicationType=microservice",
            "--dir", "out", "--yes",
        ])
        .assert()
        .success();
    assert!(!temp.path().join("out/flutter").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args(["generate", "app", "--name", "shop", "--dir", "out", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flutter-app"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn generate_from_application_file() {
    let temp = TempDir::new().unwrap();
    docs_blueprint(temp.path());
    write(
        temp.path(),
        "shop.toml",
        r#"
name = "Shop"
directory = "site"

[config]
license = "Apache-2.0"

[[entities]]
name = "OrderLine"
"#,
    );

    gantry(&temp)
        .args(["-B", "bp", "generate", "docs", "--app", "shop.toml", "--yes"])
        .assert()
        .success();

    let readme = fs::read_to_string(temp.path().join("site/README.md")).unwrap();
    // Context values win over unit defaults.
    assert_eq!(readme, "# Shop\nLicense: Apache-2.0\n");
    let entity = fs::read_to_string(temp.path().join("site/docs/order-line.md")).unwrap();
    assert_eq!(entity, "# OrderLine\n");
}

#[test]
fn rerun_reports_unchanged_files() {
    let temp = TempDir::new().unwrap();
    docs_blueprint(temp.path());
    let args = ["-B", "bp", "generate", "docs", "--name", "Demo", "--dir", "out", "--yes"];

    gantry(&temp).args(args).assert().success();
    gantry(&temp)
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));
}

#[test]
fn generate_json_report() {
    let temp = TempDir::new().unwrap();
    docs_blueprint(temp.path());

    let out = gantry(&temp)
        .args([
            "-B", "bp", "--output-format", "json", "generate", "docs", "--name", "Demo",
            "--entity", "User", "--dir", "out",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["completed"], true);
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
    assert!(report["error"].is_null());
}

// ── config / init ─────────────────────────────────────────────────────────────

#[test]
fn init_writes_default_config_once() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args(["-c", "conf/gantry.toml", "init"])
        .assert()
        .success();

    let written = fs::read_to_string(temp.path().join("conf/gantry.toml")).unwrap();
    assert!(written.contains("[engine]"));
    assert!(written.contains("max_nesting_depth = 4"));

    gantry(&temp)
        .args(["-c", "conf/gantry.toml", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn config_file_and_environment_are_applied() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "gantry.toml", "[engine]\nmax_nesting_depth = 2\nstrict_roles = true\n");

    gantry(&temp)
        .args(["-c", "gantry.toml", "config", "get", "engine.max_nesting_depth"])
        .assert()
        .success()
        .stdout("2\n");

    gantry(&temp)
        .env("GANTRY_ENGINE__STRICT_ROLES", "false")
        .args(["-c", "gantry.toml", "config", "get", "engine.strict_roles"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn config_path_honours_flag() {
    let temp = TempDir::new().unwrap();
    gantry(&temp)
        .args(["-c", "elsewhere.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere.toml"));
}
