//! Template Service - the section renderer.
//!
//! Turns a [`FileSection`] and a [`RenderContext`] into a [`RenderedFile`]:
//! destination rule evaluated, template text looked up and rendered. No
//! writes happen here; the scheduler hands the result to the filesystem.

use tracing::trace;

use crate::{
    application::ports::{TemplateRenderer, TemplateStore},
    domain::{FileSection, RenderContext, RenderedFile, TemplateId},
    error::GantryResult,
};

/// Service for template lookup and section rendering.
pub struct TemplateService {
    store: Box<dyn TemplateStore>,
    renderer: Box<dyn TemplateRenderer>,
}

impl TemplateService {
    pub fn new(store: Box<dyn TemplateStore>, renderer: Box<dyn TemplateRenderer>) -> Self {
        Self { store, renderer }
    }

    /// Render one section.
    ///
    /// Deterministic: the same template text and context content always
    /// produce the same path and content.
    pub fn render_section(
        &self,
        section: &FileSection,
        ctx: &RenderContext,
    ) -> GantryResult<RenderedFile> {
        let path = section.destination.evaluate(ctx)?;
        let text = self.store.get(&section.template)?;
        let content = self.renderer.render(&section.template, &text, ctx)?;

        trace!(template = %section.template, path = %path, bytes = content.len(), "rendered section");
        Ok(RenderedFile { path, content })
    }

    /// Render a template by id without a destination.
    pub fn render(&self, id: &TemplateId, ctx: &RenderContext) -> GantryResult<String> {
        let text = self.store.get(id)?;
        self.renderer.render(id, &text, ctx)
    }

    pub fn contains(&self, id: &TemplateId) -> bool {
        self.store.contains(id)
    }

    /// List all template ids.
    pub fn list(&self) -> GantryResult<Vec<TemplateId>> {
        self.store.list()
    }
}
