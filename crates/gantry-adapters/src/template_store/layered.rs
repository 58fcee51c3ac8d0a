//! Several stores searched in order.

use gantry_core::{
    application::{ApplicationError, TemplateStore},
    domain::TemplateId,
    error::GantryResult,
};

/// Looks a template up in each layer in turn; the first hit wins.
#[derive(Default)]
pub struct LayeredTemplates {
    layers: Vec<Box<dyn TemplateStore>>,
}

impl LayeredTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Box<dyn TemplateStore>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push(&mut self, layer: Box<dyn TemplateStore>) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl TemplateStore for LayeredTemplates {
    fn get(&self, id: &TemplateId) -> GantryResult<String> {
        for layer in &self.layers {
            match layer.get(id) {
                Ok(text) => return Ok(text),
                Err(e) if e.kind() == "TemplateNotFound" => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ApplicationError::TemplateNotFound {
            template: id.to_string(),
        }
        .into())
    }

    fn list(&self) -> GantryResult<Vec<TemplateId>> {
        let mut ids = Vec::new();
        for layer in &self.layers {
            ids.extend(layer.list()?);
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_store::InMemoryTemplates;

    #[test]
    fn earlier_layers_shadow_later_ones() {
        let store = LayeredTemplates::new()
            .with_layer(Box::new(InMemoryTemplates::new().with("a", "custom")))
            .with_layer(Box::new(
                InMemoryTemplates::new().with("a", "builtin").with("b", "builtin"),
            ));

        assert_eq!(store.get(&"a".into()).unwrap(), "custom");
        assert_eq!(store.get(&"b".into()).unwrap(), "builtin");
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(store.get(&"c".into()).unwrap_err().kind(), "TemplateNotFound");
    }
}
