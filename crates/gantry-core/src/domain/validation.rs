use crate::domain::{entities::ApplicationContext, error::DomainError};

/// Centralized domain validation.
///
/// Checks that can run before a run starts live here, not scattered across
/// services and loaders.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_context(ctx: &ApplicationContext) -> Result<(), DomainError> {
        ctx.validate()
    }

    /// Static check of a destination pattern, before any context exists.
    ///
    /// Placeholders are only checked for balance here; whether they resolve
    /// (and whether the rendered path stays inside the root) is decided when
    /// the rule is evaluated.
    pub fn validate_destination_pattern(pattern: &str) -> Result<(), DomainError> {
        let normalized = pattern.trim().replace('\\', "/");
        if normalized.is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "destination",
            });
        }
        if normalized.starts_with('/') || normalized.chars().nth(1) == Some(':') {
            return Err(DomainError::AbsolutePathNotAllowed { path: normalized });
        }
        if normalized.matches("{{").count() != normalized.matches("}}").count() {
            return Err(DomainError::InvalidContext(format!(
                "unbalanced placeholder braces in destination '{normalized}'"
            )));
        }
        Ok(())
    }
}
