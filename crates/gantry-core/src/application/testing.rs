//! Minimal port fakes for in-crate tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::application::{
    ApplicationError, GenerationService, TemplateService,
    ports::{
        Filesystem, Prompter, Question, SettingsBackend, SettingsStore, TemplateRenderer,
        TemplateStore, WriteOutcome,
    },
};
use crate::domain::{ConfigMap, RenderContext, TemplateId};
use crate::error::GantryResult;

#[derive(Clone, Default)]
pub struct FakeFs {
    pub files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl FakeFs {
    pub fn paths(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .keys()
            .map(|p| p.display().to_string())
            .collect()
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl Filesystem for FakeFs {
    fn create_dir_all(&self, _path: &Path) -> GantryResult<()> {
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> GantryResult<WriteOutcome> {
        let mut files = self.files.lock().unwrap();
        let outcome = match files.get(path) {
            Some(old) if old == content => WriteOutcome::Unchanged,
            Some(_) => WriteOutcome::Updated,
            None => WriteOutcome::Created,
        };
        files.insert(path.to_path_buf(), content.to_string());
        Ok(outcome)
    }

    fn read_file(&self, path: &Path) -> GantryResult<Option<String>> {
        Ok(self.files.lock().unwrap().get(path).cloned())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

/// Settings shared across sessions; `flushed` holds what was persisted.
#[derive(Clone, Default)]
pub struct FakeSettings {
    pub flushed: Arc<Mutex<ConfigMap>>,
}

struct FakeSession {
    pending: ConfigMap,
    target: Arc<Mutex<ConfigMap>>,
}

impl SettingsStore for FakeSession {
    fn get(&self, key: &str) -> Option<String> {
        self.pending.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.pending.insert(key.to_string(), value.to_string());
    }

    fn snapshot(&self) -> ConfigMap {
        self.pending.clone()
    }

    fn flush(&mut self) -> GantryResult<()> {
        *self.target.lock().unwrap() = self.pending.clone();
        Ok(())
    }
}

impl SettingsBackend for FakeSettings {
    fn open(&self, _base_dir: &Path) -> GantryResult<Box<dyn SettingsStore>> {
        Ok(Box::new(FakeSession {
            pending: self.flushed.lock().unwrap().clone(),
            target: Arc::clone(&self.flushed),
        }))
    }
}

/// Every template id renders as its own text, so `t:{{NAME}}` works as a
/// template id and a template at once.
pub struct EchoTemplates;

impl TemplateStore for EchoTemplates {
    fn get(&self, id: &TemplateId) -> GantryResult<String> {
        if id.as_str() == "missing" {
            return Err(ApplicationError::TemplateNotFound {
                template: id.to_string(),
            }
            .into());
        }
        Ok(id.to_string())
    }

    fn list(&self) -> GantryResult<Vec<TemplateId>> {
        Ok(Vec::new())
    }
}

pub struct LenientRenderer;

impl TemplateRenderer for LenientRenderer {
    fn render(&self, _id: &TemplateId, template: &str, ctx: &RenderContext) -> GantryResult<String> {
        Ok(ctx.render(template))
    }
}

pub struct DefaultAnswers;

impl Prompter for DefaultAnswers {
    fn prompt(&self, question: &Question) -> GantryResult<String> {
        Ok(question.default.clone().unwrap_or_default())
    }
}

pub fn service(fs: &FakeFs, settings: &FakeSettings) -> GenerationService {
    GenerationService::new(
        Box::new(fs.clone()),
        Box::new(settings.clone()),
        TemplateService::new(Box::new(EchoTemplates), Box::new(LenientRenderer)),
        Box::new(DefaultAnswers),
    )
}
