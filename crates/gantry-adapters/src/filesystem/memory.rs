//! In-memory filesystem adapter for testing and dry runs.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use gantry_core::{
    application::{ApplicationError, WriteOutcome, ports::Filesystem},
    error::GantryResult,
};

/// In-memory filesystem. Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file's content (testing helper).
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// All files, sorted by path.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn file_count(&self) -> usize {
        self.inner.read().map(|inner| inner.files.len()).unwrap_or(0)
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
        }
    }
}

impl MemoryFilesystemInner {
    fn insert_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> GantryResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert_dirs(path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> GantryResult<WriteOutcome> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if inner.directories.contains(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Is a directory".into(),
            }
            .into());
        }

        let outcome = match inner.files.get(path) {
            Some(existing) if existing == content => return Ok(WriteOutcome::Unchanged),
            Some(_) => WriteOutcome::Updated,
            None => WriteOutcome::Created,
        };

        if let Some(parent) = path.parent() {
            inner.insert_dirs(parent);
        }
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(outcome)
    }

    fn read_file(&self, path: &Path) -> GantryResult<Option<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.files.get(path).cloned())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_tracks_outcome_and_parents() {
        let fs = MemoryFilesystem::new();
        let path = Path::new("out/lib/main.dart");

        assert_eq!(fs.write_file(path, "v1").unwrap(), WriteOutcome::Created);
        assert_eq!(fs.write_file(path, "v1").unwrap(), WriteOutcome::Unchanged);
        assert_eq!(fs.write_file(path, "v2").unwrap(), WriteOutcome::Updated);

        assert!(fs.exists(Path::new("out/lib")));
        assert_eq!(fs.contents("out/lib/main.dart").as_deref(), Some("v2"));
        assert_eq!(fs.file_count(), 1);
    }

    #[test]
    fn cannot_overwrite_a_directory() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("out/lib")).unwrap();
        assert!(fs.write_file(Path::new("out/lib"), "x").is_err());
    }

    #[test]
    fn clones_share_state() {
        let fs = MemoryFilesystem::new();
        let other = fs.clone();
        fs.write_file(Path::new("a"), "1").unwrap();
        assert_eq!(other.list_files(), [PathBuf::from("a")]);
        other.clear();
        assert_eq!(fs.file_count(), 0);
    }
}
