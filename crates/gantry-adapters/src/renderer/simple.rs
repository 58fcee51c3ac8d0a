//! Simple variable substitution renderer.

use gantry_core::{
    application::{ApplicationError, TemplateRenderer},
    domain::{RenderContext, TemplateId},
    error::GantryResult,
};
use tracing::instrument;

/// `{{VARIABLE}}` substitution over the render context.
///
/// Lenient by default: unknown placeholders are left verbatim. A strict
/// renderer fails with `RenderingFailed` instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer {
    strict: bool,
}

impl SimpleRenderer {
    /// Create a new lenient renderer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(template = %id, strict = self.strict))]
    fn render(&self, id: &TemplateId, template: &str, ctx: &RenderContext) -> GantryResult<String> {
        if !self.strict {
            return Ok(ctx.render(template));
        }
        ctx.render_strict(template).map_err(|e| {
            ApplicationError::RenderingFailed {
                template: id.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
