//! Choosing how questions get answered.
//!
//! Terminal prompts need the `interactive` feature and a TTY on stdin; every
//! other case answers with the question defaults.

use std::io::{self, IsTerminal};

use gantry_adapters::DefaultsPrompter;
use gantry_core::application::Prompter;

/// Pick a prompter: terminal when possible and wanted, defaults otherwise.
pub fn select(assume_yes: bool) -> Box<dyn Prompter> {
    if !assume_yes && io::stdin().is_terminal() {
        #[cfg(feature = "interactive")]
        return Box::new(terminal::TerminalPrompter::new());
    }
    Box::new(DefaultsPrompter)
}

/// Ask for a yes/no confirmation.  Without a terminal (or the
/// `interactive` feature) the answer is yes.
pub fn confirm(message: &str) -> io::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(true);
    }
    #[cfg(feature = "interactive")]
    return terminal::confirm(message);
    #[cfg(not(feature = "interactive"))]
    {
        let _ = message;
        Ok(true)
    }
}

#[cfg(feature = "interactive")]
mod terminal {
    use std::io;

    use dialoguer::{Confirm, Input, theme::ColorfulTheme};

    use gantry_core::{
        application::{ApplicationError, Prompter, Question},
        error::GantryResult,
    };

    pub struct TerminalPrompter {
        theme: ColorfulTheme,
    }

    impl TerminalPrompter {
        pub fn new() -> Self {
            Self {
                theme: ColorfulTheme::default(),
            }
        }
    }

    impl Prompter for TerminalPrompter {
        fn prompt(&self, question: &Question) -> GantryResult<String> {
            let mut input = Input::<String>::with_theme(&self.theme)
                .with_prompt(question.message.as_str())
                .allow_empty(question.default.is_some());
            if let Some(default) = &question.default {
                input = input.default(default.clone());
            }
            input.interact_text().map_err(|e| {
                ApplicationError::PromptFailed {
                    key: question.key.clone(),
                    reason: e.to_string(),
                }
                .into()
            })
        }
    }

    pub fn confirm(message: &str) -> io::Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(true)
            .interact()
            .map_err(io::Error::other)
    }
}
