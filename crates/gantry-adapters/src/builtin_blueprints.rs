//! Blueprints that ship with Gantry.
//!
//! - **`app`**: the application entry point. Its `app` role is filled by a
//!   plain default unit (a README) and overridden at priority 100 by the
//!   Flutter unit, which asks where the mobile client should live and, for
//!   anything but a microservice, runs the `flutter` blueprint there. It
//!   refuses to run inside a generated client.
//! - **`flutter`**: a Flutter client with one Dart file per entity. It
//!   records the way back to the backend (`appDir`) in its own settings.
//!
//! Built-in template ids are namespaced like declarative ones
//! (`flutter/lib/main.dart`), so a blueprint directory named `flutter` on
//! the search path can shadow them.
//!
//! # Search path resolution order
//!
//! [`default_search_path`] lists where declarative blueprints are looked
//! for, in this order:
//!
//! 1. **`$GANTRY_BLUEPRINTS_DIR`**: environment variable override.
//! 2. **`./blueprints`**: relative to the current working directory.
//! 3. **`<executable-dir>/blueprints`**: sibling to the `gantry` binary.

use std::path::PathBuf;

use tracing::debug;

use gantry_core::{
    application::{
        ApplicationError, Blueprint, BlueprintCatalog, GeneratorUnit, Question, TaskContext,
    },
    domain::{ConfigMap, FileSection, Phase, RoleName, UnitManifest},
    error::GantryResult,
};

use crate::{tasks, template_store::InMemoryTemplates};

pub const APP_BLUEPRINT: &str = "app";
pub const FLUTTER_BLUEPRINT: &str = "flutter";
pub const APP_ROLE: &str = "app";

/// Where the Flutter client goes when nobody says otherwise.
pub const DEFAULT_FLUTTER_DIR: &str = "flutter";

/// Priority of the Flutter `app` registration; the default one uses 0.
pub const FLUTTER_APP_PRIORITY: i32 = 100;

// ── Public API ────────────────────────────────────────────────────────────────

/// Every built-in blueprint.
pub fn builtin_catalog() -> GantryResult<BlueprintCatalog> {
    Ok(BlueprintCatalog::new()
        .with(app_blueprint()?)
        .with(flutter_blueprint()?))
}

/// Template text for every built-in blueprint.
pub fn builtin_templates() -> InMemoryTemplates {
    TEMPLATES.iter().copied().collect()
}

/// Candidate directories for declarative blueprints. Entries that do not
/// exist are skipped by the loader.
pub fn default_search_path() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);

    if let Ok(env_dir) = std::env::var("GANTRY_BLUEPRINTS_DIR") {
        let p = PathBuf::from(env_dir);
        debug!(path = %p.display(), "candidate from $GANTRY_BLUEPRINTS_DIR");
        paths.push(p);
    }

    paths.push(PathBuf::from("blueprints"));

    if let Some(exe_sibling) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("blueprints")))
    {
        paths.push(exe_sibling);
    }

    paths
}

// ── Blueprints ────────────────────────────────────────────────────────────────

fn app_blueprint() -> GantryResult<Blueprint> {
    let role = RoleName::parse(APP_ROLE)?;

    let readme = GeneratorUnit::builder(
        UnitManifest::builder("app-readme")
            .description("Plain application skeleton")
            .build()?,
    )
    .section(Phase::Writing, FileSection::to("app/README.md", "README.md"))
    .build()?;

    let flutter_dir = Question::new(
        "flutterDir",
        "Where do you want to generate a Flutter application?",
    )
    .with_default(DEFAULT_FLUTTER_DIR);

    let mut skip_when = ConfigMap::new();
    skip_when.insert("applicationType".into(), "microservice".into());

    let flutter = GeneratorUnit::builder(
        UnitManifest::builder("flutter-app")
            .description("Flutter client for the application")
            .build()?,
    )
    .task(Phase::Initializing, "require-backend-dir", require_backend_dir)
    .task(Phase::Prompting, "prompt-flutter-dir", tasks::ask(vec![flutter_dir]))
    .task(
        Phase::Composing,
        "compose-flutter",
        tasks::nested_run(FLUTTER_BLUEPRINT.into(), "{{flutterDir}}".into(), skip_when),
    )
    .build()?;

    Ok(Blueprint::new(APP_BLUEPRINT, "Application with an optional Flutter client")
        .with_role(role.clone(), readme, 0)
        .with_role(role, flutter, FLUTTER_APP_PRIORITY))
}

fn flutter_blueprint() -> GantryResult<Blueprint> {
    let client = GeneratorUnit::builder(
        UnitManifest::builder("flutter-client")
            .priority(FLUTTER_APP_PRIORITY)
            .description("Flutter project files and one model per entity")
            .build()?,
    )
    .task(Phase::Initializing, "record-app-dir", record_app_dir)
    .section(Phase::Writing, FileSection::to("flutter/pubspec.yaml", "pubspec.yaml"))
    .section(Phase::Writing, FileSection::to("flutter/analysis_options.yaml", "analysis_options.yaml"))
    .section(Phase::Writing, FileSection::to("flutter/lib/main.dart", "lib/main.dart"))
    .section(
        Phase::WritingEntities,
        FileSection::to(
            "flutter/lib/entities/entity.dart",
            "lib/entities/{{ENTITY_NAME_SNAKE}}.dart",
        ),
    )
    .build()?;

    Ok(Blueprint::new(FLUTTER_BLUEPRINT, "Flutter client application").with_unit(client))
}

/// A directory that knows its way back to a backend is a generated client.
fn require_backend_dir(ctx: &mut TaskContext<'_>) -> GantryResult<()> {
    match ctx.settings().get(tasks::PARENT_DIR_KEY).filter(|dir| !dir.is_empty()) {
        Some(app_dir) => Err(ApplicationError::TaskFailed {
            reason: format!(
                "this is a generated Flutter client; run the app blueprint from the backend \
                 directory ('{app_dir}' from here)"
            ),
        }
        .into()),
        None => Ok(()),
    }
}

fn record_app_dir(ctx: &mut TaskContext<'_>) -> GantryResult<()> {
    let app_dir = ctx
        .app()
        .get(tasks::PARENT_DIR_KEY)
        .filter(|dir| !dir.is_empty())
        .map(str::to_owned);
    if let Some(app_dir) = app_dir {
        ctx.settings_mut().set(tasks::PARENT_DIR_KEY, &app_dir);
    }
    Ok(())
}

// ── Template text ─────────────────────────────────────────────────────────────

const TEMPLATES: &[(&str, &str)] = &[
    ("app/README.md", APP_README),
    ("flutter/pubspec.yaml", FLUTTER_PUBSPEC),
    ("flutter/analysis_options.yaml", FLUTTER_ANALYSIS_OPTIONS),
    ("flutter/lib/main.dart", FLUTTER_MAIN),
    ("flutter/lib/entities/entity.dart", FLUTTER_ENTITY),
];

const APP_README: &str = "# {{APP_NAME}}

Generated by Gantry.
";

const FLUTTER_PUBSPEC: &str = "name: {{APP_NAME_SNAKE}}
description: Flutter client for {{APP_NAME}}.
publish_to: 'none'
version: 0.1.0

environment:
  sdk: '>=3.0.0 <4.0.0'

dependencies:
  flutter:
    sdk: flutter
  http: ^1.2.0

dev_dependencies:
  flutter_test:
    sdk: flutter
  flutter_lints: ^4.0.0

flutter:
  uses-material-design: true
";

const FLUTTER_ANALYSIS_OPTIONS: &str = "include: package:flutter_lints/flutter.yaml
";

const FLUTTER_MAIN: &str = "import 'package:flutter/material.dart';

void main() => runApp(const {{APP_NAME_PASCAL}}App());

class {{APP_NAME_PASCAL}}App extends StatelessWidget {
  const {{APP_NAME_PASCAL}}App({super.key});

  @override
  Widget build(BuildContext context) {
    return MaterialApp(
      title: '{{APP_NAME}}',
      home: const Scaffold(
        body: Center(child: Text('{{APP_NAME}}')),
      ),
    );
  }
}
";

const FLUTTER_ENTITY: &str = "class {{ENTITY_NAME_PASCAL}} {
  final int? id;

  const {{ENTITY_NAME_PASCAL}}({this.id});

  factory {{ENTITY_NAME_PASCAL}}.fromJson(Map<String, dynamic> json) =>
      {{ENTITY_NAME_PASCAL}}(id: json['id'] as int?);

  Map<String, dynamic> toJson() => {'id': id};
}
";
