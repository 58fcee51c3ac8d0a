//! Reusable task bodies shared by declarative and built-in blueprints.

use std::path::{Component, Path};

use gantry_core::{
    application::{Question, TaskContext},
    domain::ConfigMap,
    error::GantryResult,
};
use tracing::debug;

/// Set on the context of every nested run: the way back from the nested
/// directory to the directory of the run that launched it (empty when both
/// are the same).
pub const PARENT_DIR_KEY: &str = "appDir";

/// Boxed task body, ready for `GeneratorUnitBuilder::task`.
pub type TaskFn = Box<dyn Fn(&mut TaskContext<'_>) -> GantryResult<()> + Send + Sync + 'static>;

/// Initializing: seed settings with `defaults` (absent keys only) and copy
/// the effective values into the application context.
pub fn apply_defaults(defaults: ConfigMap) -> TaskFn {
    Box::new(move |ctx| {
        let written = ctx.apply_defaults(&defaults);
        debug!(unit = %ctx.unit(), written = ?written, "applied defaults");
        Ok(())
    })
}

/// Prompting: ask each question unless the context already answers it.
///
/// A stored setting replaces the question's default. Answers go to both the
/// settings session and the application context.
pub fn ask(questions: Vec<Question>) -> TaskFn {
    Box::new(move |ctx| {
        for question in &questions {
            let answer = match ctx.app().get(&question.key) {
                Some(given) => given.to_string(),
                None => {
                    let mut question = question.clone();
                    if let Some(stored) = ctx.settings().get(&question.key) {
                        question.default = Some(stored);
                    }
                    ctx.prompt(&question)?
                }
            };
            ctx.settings_mut().set(&question.key, &answer);
            ctx.app_mut().set(question.key.clone(), answer);
        }
        Ok(())
    })
}

/// Composing: run `blueprint` to completion in `directory` (a placeholder
/// pattern, resolved strictly against the current context).
///
/// Skipped when every `skip_when` key has the given value in the context.
pub fn nested_run(blueprint: String, directory: String, skip_when: ConfigMap) -> TaskFn {
    Box::new(move |ctx| {
        let skip = !skip_when.is_empty()
            && skip_when
                .iter()
                .all(|(key, value)| ctx.app().get(key) == Some(value.as_str()));
        if skip {
            debug!(blueprint = %blueprint, "nested run skipped");
            return Ok(());
        }

        let dir = ctx.render_context().render_strict(&directory)?;
        let mut nested = ctx.nested_context(&dir);
        nested.set(PARENT_DIR_KEY, path_back(Path::new(&dir), ctx.app().base_dir()));
        ctx.run_nested(&blueprint, nested)
    })
}

/// `mobile/app` -> `../..`. Anything but plain relative steps falls back to
/// the parent directory itself.
fn path_back(dir: &Path, parent: &Path) -> String {
    let mut steps = Vec::new();
    for component in dir.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(_) => steps.push(".."),
            _ => return parent.display().to_string(),
        }
    }
    steps.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_back_climbs_one_level_per_directory() {
        let parent = Path::new("/work/shop");
        assert_eq!(path_back(Path::new("flutter"), parent), "..");
        assert_eq!(path_back(Path::new("./apps/mobile"), parent), "../..");
        assert_eq!(path_back(Path::new(""), parent), "");
    }

    #[test]
    fn path_back_falls_back_to_the_parent() {
        let parent = Path::new("/work/shop");
        assert_eq!(path_back(Path::new("../mobile"), parent), "/work/shop");
        assert_eq!(path_back(Path::new("/tmp/mobile"), parent), "/work/shop");
    }
}
