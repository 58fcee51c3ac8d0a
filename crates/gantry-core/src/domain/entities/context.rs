//! Application description and the render contexts derived from it.
//!
//! ```text
//! ApplicationContext ──owns──▶ Vec<EntityDescriptor>
//!        │                              │
//!        └──── RenderContext::for_application / for_entity ────▶ RenderContext
//! ```
//!
//! `ApplicationContext` is the single mutable resource of a run. The
//! scheduler lends it to exactly one task at a time, so it needs no locking.
//! `RenderContext` is an immutable snapshot handed to destination rules and
//! the template renderer.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Ordered key/value configuration. Ordered so iteration, rendering and
/// persistence are deterministic.
pub type ConfigMap = BTreeMap<String, String>;

// ============================================================================
// EntityDescriptor
// ============================================================================

/// One domain entity of the generated application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    name: String,
    #[serde(default)]
    config: ConfigMap,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: ConfigMap::new(),
        }
    }

    /// Builder-style config entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }
}

// ============================================================================
// ApplicationContext
// ============================================================================

/// Authoritative description of the project being generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationContext {
    name: String,
    #[serde(default)]
    base_dir: PathBuf,
    #[serde(default)]
    config: ConfigMap,
    #[serde(default)]
    entities: Vec<EntityDescriptor>,
}

impl ApplicationContext {
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_dir: base_dir.into(),
            config: ConfigMap::new(),
            entities: Vec::new(),
        }
    }

    /// Builder-style config entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style entity. Duplicate names are caught by `validate`.
    pub fn with_entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn set_base_dir(&mut self, base_dir: impl Into<PathBuf>) {
        self.base_dir = base_dir.into();
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    /// Insert only if the key is absent. Returns `true` when inserted.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.config.contains_key(&key) {
            return false;
        }
        self.config.insert(key, value.into());
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.config.remove(key)
    }

    pub fn entities(&self) -> &[EntityDescriptor] {
        &self.entities
    }

    pub fn entity_mut(&mut self, index: usize) -> Option<&mut EntityDescriptor> {
        self.entities.get_mut(index)
    }

    /// Append an entity, rejecting duplicate names.
    pub fn add_entity(&mut self, entity: EntityDescriptor) -> Result<(), DomainError> {
        if self.entities.iter().any(|e| e.name == entity.name) {
            return Err(DomainError::InvalidContext(format!(
                "entity '{}' is declared twice",
                entity.name
            )));
        }
        self.entities.push(entity);
        Ok(())
    }

    pub fn clear_entities(&mut self) {
        self.entities.clear();
    }

    /// Derive an independent context for a nested run rooted at `base_dir`.
    ///
    /// Configuration and entities are copied; the nested run never observes
    /// later mutations of this context.
    pub fn derive(&self, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: self.name.clone(),
            base_dir: base_dir.into(),
            config: self.config.clone(),
            entities: self.entities.clone(),
        }
    }

    /// Check invariants before a run starts.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidContext(
                "application name cannot be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(DomainError::InvalidContext(
                    "entity name cannot be empty".into(),
                ));
            }
            if !seen.insert(entity.name.as_str()) {
                return Err(DomainError::InvalidContext(format!(
                    "entity '{}' is declared twice",
                    entity.name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// RenderContext
// ============================================================================

/// Immutable variable snapshot used by destination rules and templates.
///
/// ## Built-in Variables
///
/// | Variable | Example | Scope |
/// |----------|---------|-------|
/// | `APP_NAME` | "Shop App" | always |
/// | `APP_NAME_SNAKE` / `_KEBAB` / `_PASCAL` / `_CAMEL` | "shop_app" | always |
/// | `BASE_DIR` | "out/shop" | always |
/// | `ENTITY_NAME` (+ case variants) | "OrderLine" | entity |
/// | `NAME` | entity name, else app name | always |
///
/// Application config keys are inserted after the application built-ins;
/// entity built-ins and entity config come last, so entity values win on
/// collision.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderContext {
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    /// Application-scope context.
    pub fn for_application(app: &ApplicationContext) -> Self {
        let mut vars = BTreeMap::new();
        insert_name_variants(&mut vars, "APP_NAME", &app.name);
        vars.insert(
            "BASE_DIR".to_string(),
            app.base_dir.display().to_string().replace('\\', "/"),
        );
        vars.insert("NAME".to_string(), app.name.clone());
        vars.extend(app.config.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { variables: vars }
    }

    /// Merge of the application and one entity; entity keys take precedence.
    pub fn for_entity(app: &ApplicationContext, entity: &EntityDescriptor) -> Self {
        let mut ctx = Self::for_application(app);
        insert_name_variants(&mut ctx.variables, "ENTITY_NAME", &entity.name);
        ctx.variables
            .insert("NAME".to_string(), entity.name.clone());
        ctx.variables
            .extend(entity.config.iter().map(|(k, v)| (k.clone(), v.clone())));
        ctx
    }

    /// Add a custom variable, consuming self and returning a new context.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Replace `{{VARIABLE}}` placeholders, leaving unknown ones verbatim.
    ///
    /// # Edge Cases
    ///
    /// - `{{ NAME }}` → whitespace inside the braces is ignored
    /// - `{{UNKNOWN}}` → remains as literal `{{UNKNOWN}}`
    /// - `{{{NAME}}}` → outer braces preserved, inner replaced
    /// - substituted values are never rescanned
    pub fn render(&self, template: &str) -> String {
        self.substitute(template, false)
            .unwrap_or_else(|_| template.to_string())
    }

    /// Like [`render`](Self::render) but unknown placeholders are an error.
    pub fn render_strict(&self, template: &str) -> Result<String, DomainError> {
        self.substitute(template, true)
    }

    /// Single left-to-right scan.
    fn substitute(&self, template: &str, strict: bool) -> Result<String, DomainError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return Ok(out);
            };

            let key = after[..end].trim();
            if key.is_empty() || key.contains('{') || key.contains('}') {
                out.push('{');
                rest = &rest[start + 1..];
                continue;
            }

            match self.variables.get(key) {
                Some(value) => out.push_str(value),
                None if strict => {
                    return Err(DomainError::UnresolvedPlaceholder {
                        placeholder: key.to_string(),
                    });
                }
                None => out.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

fn insert_name_variants(vars: &mut BTreeMap<String, String>, prefix: &str, name: &str) {
    vars.insert(prefix.to_string(), name.to_string());
    vars.insert(format!("{prefix}_SNAKE"), to_snake_case(name));
    vars.insert(format!("{prefix}_KEBAB"), to_kebab_case(name));
    vars.insert(format!("{prefix}_PASCAL"), to_pascal_case(name));
    vars.insert(format!("{prefix}_CAMEL"), to_camel_case(name));
}

// ============================================================================
// String Case Conversion Helpers
// ============================================================================

/// `"OrderLine"` → `"order_line"`.
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// `"OrderLine"` → `"order-line"`.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// `"order line"` → `"OrderLine"`.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// `"order line"` → `"orderLine"`.
pub fn to_camel_case(s: &str) -> String {
    let mut words = split_words(s).into_iter();
    match words.next() {
        Some(first) => {
            let mut out = first;
            out.extend(words.map(|w| capitalize(&w)));
            out
        }
        None => String::new(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::new();
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Split a string into lowercase words.
///
/// Boundaries: explicit separators (`_`, `-`, whitespace), a lowercase to
/// uppercase transition (`myApp`), and the end of an acronym
/// (`HTTPServer` → `http`, `server`).
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ApplicationContext {
        ApplicationContext::new("shop app", "out")
            .with("db", "postgres")
            .with("color", "blue")
            .with_entity(EntityDescriptor::new("OrderLine").with("color", "red"))
    }

    #[test]
    fn case_conversions() {
        assert_eq!(to_snake_case("HTTPRequest"), "http_request");
        assert_eq!(to_kebab_case("myAwesomeApp"), "my-awesome-app");
        assert_eq!(to_pascal_case("order line"), "OrderLine");
        assert_eq!(to_camel_case("Order-Line"), "orderLine");
    }

    #[test]
    fn application_scope_variables() {
        let ctx = RenderContext::for_application(&shop());
        assert_eq!(ctx.get("APP_NAME"), Some("shop app"));
        assert_eq!(ctx.get("APP_NAME_PASCAL"), Some("ShopApp"));
        assert_eq!(ctx.get("NAME"), Some("shop app"));
        assert_eq!(ctx.get("db"), Some("postgres"));
        assert_eq!(ctx.get("ENTITY_NAME"), None);
    }

    #[test]
    fn entity_values_take_precedence() {
        let app = shop();
        let ctx = RenderContext::for_entity(&app, &app.entities()[0]);
        assert_eq!(ctx.get("NAME"), Some("OrderLine"));
        assert_eq!(ctx.get("ENTITY_NAME_SNAKE"), Some("order_line"));
        assert_eq!(ctx.get("color"), Some("red"));
        assert_eq!(ctx.get("db"), Some("postgres"));
        assert_eq!(ctx.get("APP_NAME"), Some("shop app"));
    }

    #[test]
    fn render_edge_cases() {
        let ctx = RenderContext::default().with_variable("X", "v");
        assert_eq!(ctx.render("{{X}}{{X}}"), "vv");
        assert_eq!(ctx.render("{{ X }}"), "v");
        assert_eq!(ctx.render("{{{X}}}"), "{v}");
        assert_eq!(ctx.render("{{MISSING}} {{X}}"), "{{MISSING}} v");
        assert_eq!(ctx.render("open {{X"), "open {{X");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let ctx = RenderContext::default()
            .with_variable("A", "{{B}}")
            .with_variable("B", "b");
        assert_eq!(ctx.render("{{A}}"), "{{B}}");
    }

    #[test]
    fn strict_render_rejects_unknown_placeholders() {
        let ctx = RenderContext::default();
        assert!(matches!(
            ctx.render_strict("{{NOPE}}"),
            Err(DomainError::UnresolvedPlaceholder { .. })
        ));
    }

    #[test]
    fn set_default_only_fills_absent_keys() {
        let mut app = shop();
        assert!(!app.set_default("db", "sqlite"));
        assert!(app.set_default("port", "8080"));
        assert_eq!(app.get("db"), Some("postgres"));
        assert_eq!(app.get("port"), Some("8080"));
    }

    #[test]
    fn validate_rejects_duplicate_entities() {
        let app = ApplicationContext::new("a", ".")
            .with_entity(EntityDescriptor::new("User"))
            .with_entity(EntityDescriptor::new("User"));
        assert!(app.validate().is_err());

        let mut app = ApplicationContext::new("a", ".");
        app.add_entity(EntityDescriptor::new("User")).unwrap();
        assert!(app.add_entity(EntityDescriptor::new("User")).is_err());
    }

    #[test]
    fn derive_copies_state_with_new_root() {
        let app = shop();
        let nested = app.derive("out/mobile");
        assert_eq!(nested.base_dir(), Path::new("out/mobile"));
        assert_eq!(nested.entities().len(), 1);
        assert_eq!(nested.get("db"), Some("postgres"));
    }
}
