//! End-to-end runs through the real adapters.

use std::fs;
use std::path::Path;

use gantry_adapters::{
    BlueprintLoader, DefaultsPrompter, LayeredTemplates, LocalFilesystem, MemoryFilesystem,
    MemorySettingsBackend, PresetPrompter, SimpleRenderer, TomlSettingsBackend,
    builtin_catalog, builtin_templates, settings::SETTINGS_FILE,
};
use gantry_core::prelude::*;
use tempfile::TempDir;

fn builtin_service(
    fs: &MemoryFilesystem,
    settings: &MemorySettingsBackend,
    prompter: Box<dyn Prompter>,
) -> GenerationService {
    GenerationService::new(
        Box::new(fs.clone()),
        Box::new(settings.clone()),
        TemplateService::new(Box::new(builtin_templates()), Box::new(SimpleRenderer::new())),
        prompter,
    )
    .with_catalog(builtin_catalog().unwrap())
}

fn shop() -> ApplicationContext {
    ApplicationContext::new("Pet Shop", "out")
        .with_entity(EntityDescriptor::new("User"))
        .with_entity(EntityDescriptor::new("OrderLine"))
}

#[test]
fn flutter_app_generates_client_in_prompted_directory() {
    let fs = MemoryFilesystem::new();
    let settings = MemorySettingsBackend::new();
    let prompter = PresetPrompter::new().answer("flutterDir", "mobile");

    let report = builtin_service(&fs, &settings, Box::new(prompter)).generate("app", shop());

    assert!(report.is_completed(), "{:?}", report.error());
    assert_eq!(report.plan.names(), ["flutter-app"]);
    assert_eq!(report.overridden.len(), 1);
    assert_eq!(report.overridden[0].unit.as_str(), "app-readme");
    assert_eq!(report.nested.len(), 1);
    assert_eq!(report.total_files(), 5);

    assert!(fs.contents("out/README.md").is_none());
    assert_eq!(
        fs.contents("out/mobile/pubspec.yaml").unwrap().lines().next(),
        Some("name: pet_shop")
    );
    assert!(
        fs.contents("out/mobile/lib/entities/order_line.dart")
            .unwrap()
            .starts_with("class OrderLine {")
    );
    assert!(fs.contents("out/mobile/lib/entities/user.dart").is_some());

    assert_eq!(
        settings.stored("out").get("flutterDir").map(String::as_str),
        Some("mobile")
    );
}

#[test]
fn microservices_get_no_client() {
    let fs = MemoryFilesystem::new();
    let settings = MemorySettingsBackend::new();
    let app = shop().with("applicationType", "microservice");

    let report = builtin_service(&fs, &settings, Box::new(DefaultsPrompter)).generate("app", app);

    assert!(report.is_completed());
    assert!(report.nested.is_empty());
    assert_eq!(fs.file_count(), 0);
    assert_eq!(
        settings.stored("out").get("flutterDir").map(String::as_str),
        Some("flutter")
    );
}

#[test]
fn rerunning_is_idempotent() {
    let fs = MemoryFilesystem::new();
    let settings = MemorySettingsBackend::new();
    let service = builtin_service(&fs, &settings, Box::new(DefaultsPrompter));

    service.generate("app", shop()).into_result().unwrap();
    let before = fs.list_files();
    let second = service.generate("app", shop()).into_result().unwrap();

    assert_eq!(fs.list_files(), before);
    assert!(
        second.nested[0]
            .files
            .iter()
            .all(|f| f.outcome == WriteOutcome::Unchanged)
    );
}

#[test]
fn stored_settings_answer_later_runs() {
    let fs = MemoryFilesystem::new();
    let settings = MemorySettingsBackend::new();
    let mut stored = ConfigMap::new();
    stored.insert("flutterDir".into(), "client".into());
    settings.seed("out", stored);

    let report = builtin_service(&fs, &settings, Box::new(DefaultsPrompter)).generate("app", shop());

    assert!(report.is_completed());
    assert!(fs.contents("out/client/lib/main.dart").is_some());
}

#[test]
fn declarative_blueprint_runs_on_disk() {
    let blueprints = TempDir::new().unwrap();
    let dir = blueprints.path().join("docs");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("blueprint.toml"),
        r#"
            [blueprint]
            name = "docs"

            [[units]]
            name = "base"

            [units.defaults]
            license = "MIT"

            [[units]]
            name = "readme"
            depends_on = ["base"]

            [[units.sections]]
            phase = "writing"
            template = "README.md"

            [[units.sections]]
            phase = "writing-entities"
            template = "entity.md"
            destination = "docs/{{ENTITY_NAME_KEBAB}}.md"
        "#,
    )
    .unwrap();
    fs::write(dir.join("README.md"), "# {{APP_NAME}} ({{license}})\n").unwrap();
    fs::write(dir.join("entity.md"), "# {{ENTITY_NAME}}\n").unwrap();

    let loaded = BlueprintLoader::new([blueprints.path()]).load_all();
    assert!(loaded.skipped.is_empty());

    let out = TempDir::new().unwrap();
    let service = GenerationService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(TomlSettingsBackend::new()),
        TemplateService::new(
            Box::new(loaded.templates.with_layer(Box::new(builtin_templates()))),
            Box::new(SimpleRenderer::strict()),
        ),
        Box::new(DefaultsPrompter),
    )
    .with_catalog(loaded.catalog);

    let app = ApplicationContext::new("Pet Shop", out.path())
        .with_entity(EntityDescriptor::new("OrderLine"));
    let report = service.generate("docs", app);

    assert!(report.is_completed(), "{:?}", report.error());
    assert_eq!(report.plan.names(), ["base", "readme"]);
    assert_eq!(
        fs::read_to_string(out.path().join("README.md")).unwrap(),
        "# Pet Shop (MIT)\n"
    );
    assert!(out.path().join("docs/order-line.md").exists());
    assert!(
        fs::read_to_string(out.path().join(SETTINGS_FILE))
            .unwrap()
            .contains("license")
    );
}

#[test]
fn strict_renderer_aborts_on_unknown_placeholder() {
    let fs = MemoryFilesystem::new();
    let templates = LayeredTemplates::new().with_layer(Box::new(
        gantry_adapters::InMemoryTemplates::new().with("t/x.txt", "{{MISSING}}"),
    ));
    let unit = GeneratorUnit::builder(UnitManifest::builder("u").build().unwrap())
        .section(Phase::Writing, FileSection::to("t/x.txt", "x.txt"))
        .build()
        .unwrap();
    let service = GenerationService::new(
        Box::new(fs.clone()),
        Box::new(MemorySettingsBackend::new()),
        TemplateService::new(Box::new(templates), Box::new(SimpleRenderer::strict())),
        Box::new(DefaultsPrompter),
    );

    let report = service.run_blueprint(&Blueprint::new("t", "").with_unit(unit), shop());

    assert_eq!(report.error().map(GantryError::kind), Some("RenderingFailed"));
    assert!(!fs.exists(Path::new("out/x.txt")));
}

#[test]
fn generated_client_refuses_to_host_the_app_blueprint() {
    let fs = MemoryFilesystem::new();
    let settings = MemorySettingsBackend::new();
    let prompter = PresetPrompter::new().answer("flutterDir", "apps/mobile");

    let first = builtin_service(&fs, &settings, Box::new(prompter)).generate("app", shop());
    assert!(first.is_completed(), "{:?}", first.error());
    assert_eq!(
        settings.stored("out/apps/mobile").get("appDir").map(String::as_str),
        Some("../..")
    );
    assert!(settings.stored("out").get("appDir").is_none());
    let files_before = fs.file_count();

    let inside = ApplicationContext::new("Pet Shop", "out/apps/mobile");
    let report = builtin_service(&fs, &settings, Box::new(DefaultsPrompter)).generate("app", inside);

    assert!(!report.is_completed());
    assert_eq!(report.error().unwrap().root_cause().kind(), "TaskFailed");
    assert_eq!(report.failure.as_ref().unwrap().phase, Some(Phase::Initializing));
    assert_eq!(fs.file_count(), files_before);
}
