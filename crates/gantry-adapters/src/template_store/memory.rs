//! In-memory template store.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use gantry_core::{
    application::{ApplicationError, TemplateStore},
    domain::TemplateId,
    error::GantryResult,
};

/// Thread-safe in-memory template store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplates {
    inner: Arc<RwLock<BTreeMap<TemplateId, String>>>,
}

impl InMemoryTemplates {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, id: impl Into<TemplateId>, text: impl Into<String>) -> Self {
        self.insert(id, text);
        self
    }

    /// Insert or replace a template.
    pub fn insert(&self, id: impl Into<TemplateId>, text: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.insert(id.into(), text.into());
        }
    }

    /// Get the number of templates.
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.len()).unwrap_or(0)
    }

    /// Check if store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I, T> FromIterator<(I, T)> for InMemoryTemplates
where
    I: Into<TemplateId>,
    T: Into<String>,
{
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        let store = Self::new();
        for (id, text) in iter {
            store.insert(id, text);
        }
        store
    }
}

impl TemplateStore for InMemoryTemplates {
    fn get(&self, id: &TemplateId) -> GantryResult<String> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(id).cloned().ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                template: id.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> GantryResult<Vec<TemplateId>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.keys().cloned().collect())
    }
}
