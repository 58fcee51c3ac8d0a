//! File sections: which template lands where.
//!
//! A [`FileSection`] pairs a template identifier with a [`DestinationRule`].
//! The rule is a pure function of the render context, so the same context
//! always yields the same destination.

use std::fmt;
use std::sync::Arc;

use super::common::RelativePath;
use super::context::RenderContext;
use crate::domain::error::DomainError;

// ============================================================================
// TemplateId
// ============================================================================

/// Identifier of a template in a template store (e.g. `flutter/main.dart`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(String);

impl TemplateId {
    /// # Panics
    /// Panics if the id is blank (use `parse` for fallible construction).
    pub fn new(id: impl Into<String>) -> Self {
        match Self::parse(id) {
            Ok(id) => id,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn parse(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidName {
                kind: "template",
                name: id,
                reason: "cannot be empty".into(),
            });
        }
        Ok(Self(id.replace('\\', "/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ============================================================================
// DestinationRule
// ============================================================================

type ComputeFn = dyn Fn(&RenderContext) -> Result<RelativePath, DomainError> + Send + Sync;

/// How a section's destination path is derived from the render context.
#[derive(Clone)]
pub enum DestinationRule {
    /// Always the same path.
    Fixed(RelativePath),

    /// A path containing `{{VARIABLE}}` placeholders, e.g.
    /// `lib/entities/{{ENTITY_NAME_SNAKE}}.dart`.
    ///
    /// Placeholders in destinations must always resolve; an unknown one is
    /// an error regardless of template strictness.
    Pattern(String),

    /// Arbitrary pure function of the context.
    Computed(Arc<ComputeFn>),
}

impl DestinationRule {
    pub fn fixed(path: impl Into<std::path::PathBuf>) -> Result<Self, DomainError> {
        Ok(Self::Fixed(RelativePath::try_new(path)?))
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern(pattern.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&RenderContext) -> Result<RelativePath, DomainError> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Evaluate the rule against a context.
    pub fn evaluate(&self, ctx: &RenderContext) -> Result<RelativePath, DomainError> {
        match self {
            Self::Fixed(path) => Ok(path.clone()),
            Self::Pattern(pattern) => RelativePath::try_new(ctx.render_strict(pattern)?),
            Self::Computed(f) => f(ctx),
        }
    }
}

impl fmt::Debug for DestinationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

impl fmt::Display for DestinationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(path) => write!(f, "{path}"),
            Self::Pattern(pattern) => f.write_str(pattern),
            Self::Computed(_) => f.write_str("<computed>"),
        }
    }
}

// ============================================================================
// FileSection / RenderedFile
// ============================================================================

/// Template -> destination mapping declared by a unit for one phase.
#[derive(Debug, Clone)]
pub struct FileSection {
    pub template: TemplateId,
    pub destination: DestinationRule,
}

impl FileSection {
    pub fn new(template: impl Into<TemplateId>, destination: DestinationRule) -> Self {
        Self {
            template: template.into(),
            destination,
        }
    }

    /// Shorthand for a pattern destination.
    pub fn to(template: impl Into<TemplateId>, pattern: impl Into<String>) -> Self {
        Self::new(template, DestinationRule::pattern(pattern))
    }
}

/// Output of the template renderer, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: RelativePath,
    pub content: String,
}

impl RenderedFile {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}
