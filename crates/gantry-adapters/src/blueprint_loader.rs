//! Declarative blueprints loaded from `blueprint.toml` manifests.
//!
//! # Directory layout expected
//!
//! ```text
//! blueprints/
//! ├── docs/
//! │   ├── blueprint.toml       ← manifest (required)
//! │   ├── README.md            ← template text
//! │   └── docs/
//! │       └── entity.md
//! └── service/
//!     ├── blueprint.toml
//!     └── main.rs
//! ```
//!
//! # `blueprint.toml` format
//!
//! ```toml
//! [blueprint]
//! name        = "docs"
//! description = "Project documentation"   # optional
//!
//! [[units]]
//! name          = "readme"
//! version       = "1.0.0"                  # optional, default 0.1.0
//! priority      = 0                        # optional
//! depends_on    = ["base"]                 # optional
//! role          = "docs"                   # optional, default: the unit name
//! role_priority = 10                       # optional
//!
//! [units.defaults]                         # applied during initializing
//! license = "MIT"
//!
//! [[units.prompts]]                        # asked during prompting
//! key     = "author"
//! message = "Who is the author?"
//! default = "anonymous"
//!
//! [[units.sections]]
//! phase       = "writing"                  # writing | writing-entities
//! template    = "README.md"                # relative to the manifest
//! destination = "README.md"                # optional, default: template path
//!
//! [[units.nested]]                         # run during composing
//! blueprint = "flutter"
//! directory = "{{flutterDir}}"
//! skip_when = { applicationType = "microservice" }
//! ```
//!
//! Template ids are namespaced by blueprint name: the section above reads
//! `docs/README.md` from the template store returned alongside the catalog.

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use gantry_core::{
    application::{ApplicationError, Blueprint, BlueprintCatalog, GeneratorUnit, Question},
    domain::{
        ConfigMap, DestinationRule, DomainError, DomainValidator, FileSection, Phase, RoleName,
        TemplateId, UnitManifest,
    },
    error::GantryError,
};

use crate::{
    tasks,
    template_store::{DirectoryTemplates, LayeredTemplates},
};

pub const MANIFEST_FILE: &str = "blueprint.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised `blueprint.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BlueprintManifest {
    pub blueprint: BlueprintSection,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BlueprintSection {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One `[[units]]` entry.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UnitEntry {
    pub name: String,
    pub version: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub role_priority: i32,
    #[serde(default)]
    pub defaults: ConfigMap,
    #[serde(default)]
    pub prompts: Vec<PromptEntry>,
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
    #[serde(default)]
    pub nested: Vec<NestedEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PromptEntry {
    pub key: String,
    pub message: String,
    pub default: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SectionEntry {
    pub phase: String,
    pub template: String,
    pub destination: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct NestedEntry {
    pub blueprint: String,
    pub directory: String,
    #[serde(default)]
    pub skip_when: ConfigMap,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why one blueprint directory could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing blueprint.toml")]
    MissingManifest,

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse blueprint.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unit '{unit}': {reason}")]
    Unit { unit: String, reason: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl LoadError {
    fn unit(unit: &str, reason: impl Into<String>) -> Self {
        Self::Unit {
            unit: unit.to_string(),
            reason: reason.into(),
        }
    }

    pub fn into_gantry(self, dir: &Path) -> GantryError {
        ApplicationError::BlueprintInvalid {
            path: dir.to_path_buf(),
            reason: self.to_string(),
        }
        .into()
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Everything discovered on the search path.
#[derive(Default)]
pub struct LoadedBlueprints {
    pub catalog: BlueprintCatalog,
    /// One namespaced directory store per loaded blueprint.
    pub templates: LayeredTemplates,
    /// Directories that held a manifest but failed to load.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Discovers blueprint directories on a search path.
///
/// A blueprint directory is any directory (the search root itself or one of
/// its immediate subdirectories) containing `blueprint.toml`. Directories
/// whose manifest is invalid are skipped with a `WARN` log; they do not
/// prevent other blueprints from loading. Missing search roots are ignored.
#[derive(Debug, Clone, Default)]
pub struct BlueprintLoader {
    search_path: Vec<PathBuf>,
}

impl BlueprintLoader {
    pub fn new<I, P>(search_path: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_path: search_path.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Load every valid blueprint on the search path.
    ///
    /// A later blueprint with the same name replaces an earlier one.
    #[instrument(skip(self), fields(roots = self.search_path.len()))]
    pub fn load_all(&self) -> LoadedBlueprints {
        let mut loaded = LoadedBlueprints::default();

        for dir in self.discover() {
            match self.load_dir(&dir) {
                Ok((blueprint, templates)) => {
                    debug!(name = blueprint.name(), dir = %dir.display(), "loaded blueprint");
                    if let Some(previous) = loaded.catalog.register(blueprint) {
                        warn!(name = previous.name(), dir = %dir.display(), "blueprint replaced");
                    }
                    loaded.templates.push(Box::new(templates));
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping blueprint directory due to load error");
                    loaded.skipped.push((dir, e.to_string()));
                }
            }
        }

        debug!(count = loaded.catalog.len(), skipped = loaded.skipped.len(), "finished loading blueprints");
        loaded
    }

    /// Directories holding a manifest, sorted within each root.
    fn discover(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for root in &self.search_path {
            if !root.is_dir() {
                debug!(root = %root.display(), "search path entry does not exist");
                continue;
            }
            let walker = WalkDir::new(root)
                .min_depth(1)
                .max_depth(2)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(root = %root.display(), error = %e, "directory walk error");
                        None
                    }
                });
            for entry in walker {
                if entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE {
                    if let Some(dir) = entry.path().parent() {
                        found.push(dir.to_path_buf());
                    }
                }
            }
        }
        found
    }

    /// Load a single blueprint directory.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&self, dir: &Path) -> Result<(Blueprint, DirectoryTemplates), LoadError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = match fs::read_to_string(&manifest_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LoadError::MissingManifest),
            Err(source) => {
                return Err(LoadError::Io {
                    path: manifest_path,
                    source,
                })
            }
        };
        let manifest: BlueprintManifest = toml::from_str(&raw)?;
        let blueprint = build_blueprint(&manifest, dir)?;
        let templates = DirectoryTemplates::new(dir).with_prefix(blueprint.name());
        Ok((blueprint, templates))
    }
}

/// Turn a parsed manifest into a runnable blueprint. Section templates must
/// exist below `dir`.
pub fn build_blueprint(manifest: &BlueprintManifest, dir: &Path) -> Result<Blueprint, LoadError> {
    let name = manifest.blueprint.name.trim();
    if name.is_empty() || name.contains('/') {
        return Err(DomainError::InvalidName {
            kind: "blueprint",
            name: name.to_string(),
            reason: "must be non-empty and contain no '/'".into(),
        }
        .into());
    }

    let mut blueprint = Blueprint::new(name, manifest.blueprint.description.clone());
    for entry in &manifest.units {
        let unit = build_unit(name, entry, dir)?;
        let role = RoleName::parse(entry.role.as_deref().unwrap_or(&entry.name))?;
        blueprint = blueprint.with_role(role, unit, entry.role_priority);
    }
    Ok(blueprint)
}

fn build_unit(blueprint: &str, entry: &UnitEntry, dir: &Path) -> Result<GeneratorUnit, LoadError> {
    let mut manifest = UnitManifest::builder(entry.name.clone())
        .priority(entry.priority)
        .dependencies(entry.depends_on.iter().cloned());
    if let Some(version) = &entry.version {
        manifest = manifest.version(version.clone());
    }
    if let Some(description) = &entry.description {
        manifest = manifest.description(description.clone());
    }

    let mut unit = GeneratorUnit::builder(manifest.build()?);

    if !entry.defaults.is_empty() {
        unit = unit.task(
            Phase::Initializing,
            "apply-defaults",
            tasks::apply_defaults(entry.defaults.clone()),
        );
    }

    if !entry.prompts.is_empty() {
        let questions = entry
            .prompts
            .iter()
            .map(|p| {
                let q = Question::new(p.key.clone(), p.message.clone());
                match &p.default {
                    Some(default) => q.with_default(default.clone()),
                    None => q,
                }
            })
            .collect();
        unit = unit.task(Phase::Prompting, "prompt", tasks::ask(questions));
    }

    for nested in &entry.nested {
        unit = unit.task(
            Phase::Composing,
            format!("nested:{}", nested.blueprint),
            tasks::nested_run(
                nested.blueprint.clone(),
                nested.directory.clone(),
                nested.skip_when.clone(),
            ),
        );
    }

    for section in &entry.sections {
        let phase = Phase::from_str(&section.phase)?;
        let template = section.template.trim_start_matches("./").replace('\\', "/");
        if template == MANIFEST_FILE || !dir.join(&template).is_file() {
            return Err(LoadError::unit(
                &entry.name,
                format!("template '{template}' not found in {}", dir.display()),
            ));
        }
        let destination = section.destination.clone().unwrap_or_else(|| template.clone());
        DomainValidator::validate_destination_pattern(&destination)?;
        let id = TemplateId::parse(format!("{blueprint}/{template}"))?;
        unit = unit.section(phase, FileSection::new(id, DestinationRule::pattern(destination)));
    }

    Ok(unit.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::application::TemplateStore;
    use tempfile::TempDir;

    const DOCS: &str = r#"
        [blueprint]
        name = "docs"
        description = "Project documentation"

        [[units]]
        name = "readme"
        priority = 5

        [units.defaults]
        license = "MIT"

        [[units.prompts]]
        key = "author"
        message = "Who is the author?"
        default = "anonymous"

        [[units.sections]]
        phase = "writing"
        template = "README.md"

        [[units.sections]]
        phase = "writing-entities"
        template = "entity.md"
        destination = "docs/{{ENTITY_NAME_KEBAB}}.md"
    "#;

    fn write_blueprint(root: &Path, dir: &str, manifest: &str, files: &[(&str, &str)]) {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        for (path, content) in files {
            let path = dir.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    fn docs(root: &Path) {
        write_blueprint(
            root,
            "docs",
            DOCS,
            &[("README.md", "# {{APP_NAME}}"), ("entity.md", "# {{ENTITY_NAME}}")],
        );
    }

    #[test]
    fn loads_units_roles_and_sections() {
        let temp = TempDir::new().unwrap();
        docs(temp.path());

        let (blueprint, templates) = BlueprintLoader::default()
            .load_dir(&temp.path().join("docs"))
            .unwrap();

        assert_eq!(blueprint.name(), "docs");
        assert_eq!(blueprint.roles(), ["readme"]);
        let unit = blueprint.units().next().unwrap();
        assert_eq!(unit.manifest().priority(), 5);
        assert_eq!(unit.manifest().version(), "0.1.0");
        assert_eq!(
            unit.active_phases(),
            [Phase::Initializing, Phase::Prompting, Phase::Writing, Phase::WritingEntities]
        );
        assert_eq!(unit.sections(Phase::Writing)[0].template.as_str(), "docs/README.md");
        assert_eq!(templates.get(&"docs/README.md".into()).unwrap(), "# {{APP_NAME}}");
    }

    #[test]
    fn load_all_skips_invalid_directories() {
        let temp = TempDir::new().unwrap();
        docs(temp.path());
        write_blueprint(temp.path(), "broken", "[blueprint", &[]);
        write_blueprint(
            temp.path(),
            "orphan",
            r#"
                [blueprint]
                name = "orphan"
                [[units]]
                name = "u"
                [[units.sections]]
                phase = "writing"
                template = "gone.txt"
            "#,
            &[],
        );
        fs::create_dir_all(temp.path().join("not-a-blueprint")).unwrap();

        let loaded = BlueprintLoader::new([temp.path()]).load_all();

        assert_eq!(loaded.catalog.len(), 1);
        assert!(loaded.catalog.contains("docs"));
        let skipped: Vec<_> = loaded
            .skipped
            .iter()
            .map(|(dir, _)| dir.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(skipped, ["broken", "orphan"]);
        assert!(loaded.skipped[1].1.contains("gone.txt"));
    }

    #[test]
    fn sections_outside_writing_phases_are_rejected() {
        let temp = TempDir::new().unwrap();
        write_blueprint(
            temp.path(),
            "bad",
            r#"
                [blueprint]
                name = "bad"
                [[units]]
                name = "u"
                [[units.sections]]
                phase = "install"
                template = "x.txt"
            "#,
            &[("x.txt", "x")],
        );

        let err = BlueprintLoader::default()
            .load_dir(&temp.path().join("bad"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Domain(DomainError::InvalidUnit { .. })));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let temp = TempDir::new().unwrap();
        write_blueprint(
            temp.path(),
            "typo",
            "[blueprint]\nname = \"typo\"\n[[units]]\nname = \"u\"\npriorty = 3\n",
            &[],
        );
        let err = BlueprintLoader::default()
            .load_dir(&temp.path().join("typo"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert_eq!(err.into_gantry(temp.path()).kind(), "BlueprintInvalid");
    }

    #[test]
    fn nested_templates_are_namespaced_and_keep_their_path() {
        let temp = TempDir::new().unwrap();
        write_blueprint(
            temp.path(),
            "client",
            r#"
                [blueprint]
                name = "client"
                [[units]]
                name = "app"
                [[units.sections]]
                phase = "writing"
                template = "./lib/main.dart"
            "#,
            &[("lib/main.dart", "void main() {}")],
        );

        let (blueprint, templates) = BlueprintLoader::default()
            .load_dir(&temp.path().join("client"))
            .unwrap();

        let section = &blueprint.units().next().unwrap().sections(Phase::Writing)[0];
        assert_eq!(section.template.as_str(), "client/lib/main.dart");
        assert_eq!(section.destination.to_string(), "lib/main.dart");
        assert_eq!(templates.get(&section.template).unwrap(), "void main() {}");
    }

    #[test]
    fn missing_search_roots_are_ignored() {
        let loaded = BlueprintLoader::new(["/no/such/dir"]).load_all();
        assert!(loaded.catalog.is_empty());
        assert!(loaded.skipped.is_empty());
    }
}
