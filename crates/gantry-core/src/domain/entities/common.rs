use super::DomainError;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A destination path guaranteed to stay inside the output root.
///
/// Invariant: never absolute and never climbs above the root with `..`.
/// Enforced at construction. Separators are normalised to `/` so the same
/// rule yields the same path on every platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Create a new relative path.
    ///
    /// # Panics
    /// Panics if path is absolute or escapes the root (use `try_new` for fallible).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        match Self::try_new(path) {
            Ok(p) => p,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible constructor.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let raw = path.into();
        let display = raw.display().to_string().replace('\\', "/");

        if raw.is_absolute() || display.starts_with('/') {
            return Err(DomainError::AbsolutePathNotAllowed { path: display });
        }

        let mut normalized = PathBuf::new();
        for component in Path::new(&display).components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(DomainError::PathEscapesRoot { path: display });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed { path: display });
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(DomainError::InvalidContext(format!(
                "destination '{display}' resolves to the output root itself"
            )));
        }

        Ok(Self(normalized))
    }

    /// Join a segment, maintaining the relative invariant.
    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        Self::try_new(self.0.join(segment))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dots_and_backslashes() {
        let p = RelativePath::try_new("lib\\entities\\./user.dart").unwrap();
        assert_eq!(p.as_path(), Path::new("lib/entities/user.dart"));

        let p = RelativePath::try_new("lib/tmp/../main.dart").unwrap();
        assert_eq!(p.as_path(), Path::new("lib/main.dart"));
    }

    #[test]
    fn rejects_absolute_and_escaping_paths() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
        assert!(matches!(
            RelativePath::try_new("../outside.txt"),
            Err(DomainError::PathEscapesRoot { .. })
        ));
        assert!(RelativePath::try_new(".").is_err());
    }

    #[test]
    fn join_keeps_invariant() {
        let base = RelativePath::new("lib");
        assert_eq!(base.join("main.dart").unwrap().as_str(), "lib/main.dart");
        assert!(base.join("../../x").is_err());
    }
}
