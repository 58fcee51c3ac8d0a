//! Command handlers plus the adapter wiring they share.

pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod list;
pub mod plan;

use tracing::{debug, warn};

use gantry_adapters::{
    BlueprintLoader, LocalFilesystem, SimpleRenderer, TomlSettingsBackend, builtin_catalog,
    builtin_templates,
};
use gantry_core::application::{
    BlueprintCatalog, EngineOptions, GenerationService, Prompter, TemplateService,
};

use crate::{cli::GlobalArgs, config::AppConfig, error::CliResult, output::OutputManager};

/// Built-in blueprints overlaid by every valid blueprint on the search path.
pub struct Blueprints {
    pub catalog: BlueprintCatalog,
    pub templates: gantry_adapters::LayeredTemplates,
}

impl Blueprints {
    pub fn load(global: &GlobalArgs, config: &AppConfig, output: &OutputManager) -> CliResult<Self> {
        let search_path = config.search_path(&global.blueprints);
        debug!(?search_path, "loading blueprints");

        let loaded = BlueprintLoader::new(search_path).load_all();
        for (dir, reason) in &loaded.skipped {
            warn!(dir = %dir.display(), %reason, "skipped blueprint directory");
            output.warning(&format!("Skipped blueprint at {}: {reason}", dir.display()))?;
        }

        let mut catalog = builtin_catalog()?;
        catalog.extend(loaded.catalog);

        // Loaded templates shadow built-in ones with the same id.
        let templates = loaded.templates.with_layer(Box::new(builtin_templates()));

        Ok(Self { catalog, templates })
    }

    /// A service over the real filesystem and `.gantry.toml` settings.
    pub fn into_service(
        self,
        config: &AppConfig,
        options: EngineOptions,
        prompter: Box<dyn Prompter>,
    ) -> GenerationService {
        let renderer = if config.engine.strict_templates {
            SimpleRenderer::strict()
        } else {
            SimpleRenderer::new()
        };

        GenerationService::new(
            Box::new(LocalFilesystem::new()),
            Box::new(TomlSettingsBackend::new()),
            TemplateService::new(Box::new(self.templates), Box::new(renderer)),
            prompter,
        )
        .with_catalog(self.catalog)
        .with_options(options)
    }
}
