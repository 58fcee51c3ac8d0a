//! Templates served from a directory tree.
//!
//! A template's id is its path relative to the root, with forward slashes:
//! `<root>/lib/main.dart` is `lib/main.dart`. With a prefix (declarative
//! blueprints use their own name) the same file is `<prefix>/lib/main.dart`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use gantry_core::{
    application::{ApplicationError, TemplateStore},
    domain::{RelativePath, TemplateId},
    error::{GantryError, GantryResult},
};

/// Files under `root` that are never served as templates.
const IGNORED: &[&str] = &["blueprint.toml"];

#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
    prefix: Option<String>,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: None,
        }
    }

    /// Serve every file as `<prefix>/<relative path>`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into().trim_matches('/').to_string());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `None` when the id lies outside this store's prefix.
    fn resolve(&self, id: &TemplateId) -> GantryResult<Option<PathBuf>> {
        let raw = match &self.prefix {
            Some(prefix) => {
                let rest = id
                    .as_str()
                    .strip_prefix(prefix.as_str())
                    .and_then(|r| r.strip_prefix('/'));
                match rest {
                    Some(rest) => rest,
                    None => return Ok(None),
                }
            }
            None => id.as_str(),
        };
        let relative = RelativePath::try_new(raw)?;
        Ok(Some(self.root.join(relative.as_path())))
    }

    fn id_for(&self, relative: String) -> TemplateId {
        match &self.prefix {
            Some(prefix) => TemplateId::new(format!("{prefix}/{relative}")),
            None => TemplateId::new(relative),
        }
    }
}

impl TemplateStore for DirectoryTemplates {
    fn get(&self, id: &TemplateId) -> GantryResult<String> {
        let Some(path) = self.resolve(id)? else {
            return Err(ApplicationError::TemplateNotFound {
                template: id.to_string(),
            }
            .into());
        };
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ApplicationError::TemplateNotFound {
                    template: id.to_string(),
                }
                .into())
            }
            Err(e) => Err(io_error(&path, e)),
        }
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn list(&self) -> GantryResult<Vec<TemplateId>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::FilesystemError {
                path: self.root.clone(),
                reason: format!("directory walk error: {e}"),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let id = relative.to_string_lossy().replace('\\', "/");
            if IGNORED.contains(&id.as_str()) {
                continue;
            }
            ids.push(self.id_for(id));
        }

        ids.sort();
        debug!(count = ids.len(), "listed templates");
        Ok(ids)
    }
}

fn io_error(path: &Path, e: io::Error) -> GantryError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to read template: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("lib/entities")).unwrap();
        fs::write(temp.path().join("blueprint.toml"), "").unwrap();
        fs::write(temp.path().join("pubspec.yaml"), "name: {{APP_NAME_SNAKE}}").unwrap();
        fs::write(temp.path().join("lib/entities/entity.dart"), "class {{ENTITY_NAME_PASCAL}} {}")
            .unwrap();
        temp
    }

    #[test]
    fn ids_are_relative_forward_slash_paths() {
        let temp = tree();
        let store = DirectoryTemplates::new(temp.path());

        let ids: Vec<String> = store.list().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(ids, ["lib/entities/entity.dart", "pubspec.yaml"]);
        assert_eq!(
            store.get(&"lib/entities/entity.dart".into()).unwrap(),
            "class {{ENTITY_NAME_PASCAL}} {}"
        );
    }

    #[test]
    fn ids_cannot_escape_the_root() {
        let temp = tree();
        let store = DirectoryTemplates::new(temp.path().join("lib"));
        let err = store.get(&"../pubspec.yaml".into()).unwrap_err();
        assert_eq!(err.kind(), "PathEscapesRoot");
    }

    #[test]
    fn prefixed_store_namespaces_ids() {
        let temp = tree();
        let store = DirectoryTemplates::new(temp.path()).with_prefix("flutter");

        assert_eq!(store.list().unwrap()[1].as_str(), "flutter/pubspec.yaml");
        assert!(store.get(&"flutter/pubspec.yaml".into()).is_ok());
        assert_eq!(
            store.get(&"pubspec.yaml".into()).unwrap_err().kind(),
            "TemplateNotFound"
        );
    }

    #[test]
    fn missing_root_lists_nothing() {
        let store = DirectoryTemplates::new("/definitely/not/here");
        assert!(store.list().unwrap().is_empty());
        assert_eq!(
            store.get(&"x".into()).unwrap_err().kind(),
            "TemplateNotFound"
        );
    }
}
