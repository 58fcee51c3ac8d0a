//! Command output on stdout.
//!
//! Logs and errors go to stderr (see `logging.rs` and `main.rs`); this is
//! everything a command prints for the user. Quiet mode and JSON mode both
//! keep prose off stdout so `--output-format json` stays parseable.

use std::io::{self, IsTerminal};

use clap::ValueEnum;
use console::Term;
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    color: bool,
    term: Term,
}

impl OutputManager {
    /// The flag wins over `output.format`; whatever is still `auto` becomes
    /// Human on a terminal and Plain otherwise.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => {
                OutputFormat::from_str(&config.output.format, true).unwrap_or(OutputFormat::Auto)
            }
            explicit => explicit,
        };
        let format = match requested {
            OutputFormat::Auto if io::stdout().is_terminal() => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Plain,
            resolved => resolved,
        };

        Self {
            format,
            quiet: args.quiet,
            color: format == OutputFormat::Human && !args.no_color && !config.output.no_color,
            term: Term::stdout(),
        }
    }

    fn silent(&self) -> bool {
        self.quiet || self.is_json()
    }

    fn emit(&self, line: &str) -> io::Result<()> {
        if self.silent() {
            return Ok(());
        }
        self.term.write_line(line)
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_owned()
        }
    }

    /// `<glyph> <msg>`, both in `style` when colors are on.
    fn tagged(&self, glyph: &str, msg: &str, style: Style) -> io::Result<()> {
        self.emit(&format!("{} {}", self.paint(glyph, style.bold()), self.paint(msg, style)))
    }

    pub fn print(&self, msg: &str) -> io::Result<()> {
        self.emit(msg)
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.tagged("\u{2713}", msg, Style::new().green())
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.tagged("\u{26a0}", msg, Style::new().yellow())
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.tagged("\u{2139}", msg, Style::new().blue())
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        self.emit(&self.paint(text, Style::new().cyan().bold()))
    }

    /// One written file: `  created   out/README.md  (readme @ writing)`.
    pub fn file(&self, outcome: &str, path: &str, detail: &str) -> io::Result<()> {
        let style = match outcome {
            "created" => Style::new().green(),
            "updated" => Style::new().yellow(),
            _ => Style::new().dimmed(),
        };
        let tag = self.paint(&format!("{outcome:<9}"), style);
        let detail = self.paint(&format!("({detail})"), Style::new().dimmed());
        self.emit(&format!("  {tag} {path}  {detail}"))
    }

    /// Pretty JSON. Written even with `--quiet`, since that combination
    /// still has to produce something parseable.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
