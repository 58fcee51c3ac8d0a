//! Local filesystem adapter using std::fs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gantry_core::{
    application::{ApplicationError, WriteOutcome, ports::Filesystem},
    error::{GantryError, GantryResult},
};
use tracing::trace;
use uuid::Uuid;

/// Production filesystem implementation using `std::fs`.
///
/// Writes go to a sibling temporary file first and are renamed into place,
/// so an interrupted run never leaves a half-written file behind.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> GantryResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> GantryResult<WriteOutcome> {
        // Compared as bytes: an existing binary or unreadable file is simply
        // replaced.
        let outcome = match fs::read(path) {
            Ok(existing) if existing == content.as_bytes() => return Ok(WriteOutcome::Unchanged),
            Ok(_) => WriteOutcome::Updated,
            Err(e) if e.kind() == io::ErrorKind::NotFound => WriteOutcome::Created,
            Err(e) => {
                trace!(path = %path.display(), error = %e, "existing file unreadable, replacing");
                WriteOutcome::Updated
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }

        let staging = staging_path(path);
        trace!(path = %path.display(), staging = %staging.display(), "staging write");
        fs::write(&staging, content).map_err(|e| map_io_error(path, e, "write file"))?;
        if let Err(e) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(map_io_error(path, e, "replace file"));
        }
        Ok(outcome)
    }

    fn read_file(&self, path: &Path) -> GantryResult<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(path, e, "read file")),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> GantryError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
