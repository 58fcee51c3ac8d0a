//! Non-interactive prompters.

use std::collections::BTreeMap;

use gantry_core::{
    application::{ApplicationError, Prompter, Question},
    error::GantryResult,
};
use tracing::debug;

/// Answers every question with its default (empty when there is none).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn prompt(&self, question: &Question) -> GantryResult<String> {
        let answer = question.default.clone().unwrap_or_default();
        debug!(key = %question.key, answer = %answer, "answered with default");
        Ok(answer)
    }
}

/// Answers from a fixed map keyed by question key.
///
/// Unknown keys fall back to the question's default; a question with
/// neither fails with `PromptFailed` unless `allow_empty` is set.
#[derive(Debug, Clone, Default)]
pub struct PresetPrompter {
    answers: BTreeMap<String, String>,
    allow_empty: bool,
}

impl PresetPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.insert(key.into(), value.into());
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PresetPrompter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            allow_empty: false,
        }
    }
}

impl Prompter for PresetPrompter {
    fn prompt(&self, question: &Question) -> GantryResult<String> {
        if let Some(answer) = self.answers.get(&question.key) {
            return Ok(answer.clone());
        }
        match (&question.default, self.allow_empty) {
            (Some(default), _) => Ok(default.clone()),
            (None, true) => Ok(String::new()),
            (None, false) => Err(ApplicationError::PromptFailed {
                key: question.key.clone(),
                reason: "no preset answer and no default".into(),
            }
            .into()),
        }
    }
}
