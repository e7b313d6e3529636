//! Terminal output for the CLI.
//!
//! Handlers print through these helpers so that `--json`, `--quiet` and
//! `-v` behave the same everywhere. In JSON mode, progress lines become
//! `{"type": .., "payload": ..}` events and results are printed as one
//! document by [`json_output`].

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde_json::{json, Value};

/// Output flags from the global CLI options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    /// Number of `-v` flags.
    pub verbose: u8,
    /// Style human output with ANSI colors.
    pub color: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
            color: false,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// How a line of regular output should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Json,
    Quiet,
    Human,
}

static CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn cell() -> &'static RwLock<OutputConfig> {
    CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn current() -> OutputConfig {
    *cell().read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn mode() -> Mode {
    let config = current();
    if config.json {
        Mode::Json
    } else if config.quiet {
        Mode::Quiet
    } else {
        Mode::Human
    }
}

fn event(kind: &str, payload: Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    *cell().write().unwrap_or_else(std::sync::PoisonError::into_inner) = config;
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn is_quiet() -> bool {
    current().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    current().verbose
}

/// Print the program name and version.
pub fn header(version: &str) {
    if mode() == Mode::Human {
        println!("{} {}", paint("bankpeer", |v| v.bold().to_string()), muted(version));
    }
}

/// Print an aligned `label value` line.
pub fn field(label: &str, value: impl Display) {
    match mode() {
        Mode::Json => event("field", json!({ "label": label, "value": value.to_string() })),
        Mode::Quiet => {}
        Mode::Human => println!("  {} {}", muted(format!("{label:<14}")), value),
    }
}

pub fn success(message: &str) {
    match mode() {
        Mode::Json => event("success", json!({ "message": message })),
        Mode::Quiet => {}
        Mode::Human => println!("  {} {}", positive("✓"), message),
    }
}

/// Print a warning. Shown in quiet mode too.
pub fn warning(message: &str) {
    match mode() {
        Mode::Json => event("warning", json!({ "message": message })),
        Mode::Quiet | Mode::Human => {
            println!("  {} {}", paint("!", |v| v.yellow().bold().to_string()), message);
        }
    }
}

/// Print an error to stderr.
pub fn error(message: &str) {
    if mode() == Mode::Json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
    } else {
        eprintln!("  {} {}", paint("error:", |v| v.red().bold().to_string()), message);
    }
}

pub fn section(title: &str) {
    if mode() == Mode::Human {
        println!();
        println!("{}", paint(title, |v| v.bold().underline().to_string()));
    }
}

pub fn note(message: &str) {
    if mode() == Mode::Human {
        println!("  {}", muted(message));
    }
}

pub fn hint(message: &str) {
    if mode() == Mode::Human {
        println!("  {} {}", highlight("hint:"), muted(message));
    }
}

/// Print pre-rendered content (such as a table), indented.
pub fn lines(content: &str) {
    if mode() == Mode::Human {
        content.lines().for_each(|line| println!("  {line}"));
    }
}

/// Print the structured result of a command.
pub fn json_output(value: Value) {
    println!("{value}");
}

/// Start a spinner. Hidden unless output is for a human.
pub fn spinner(message: &str) -> ProgressBar {
    if mode() != Mode::Human {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_spinner()
        .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let pb = ProgressBar::new_spinner().with_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn spinner_success(pb: &ProgressBar, message: &str) {
    finish(pb, format!("{} {message}", positive("✓")));
}

pub fn spinner_fail(pb: &ProgressBar, message: &str) {
    finish(pb, format!("{} {message}", negative("✗")));
}

fn finish(pb: &ProgressBar, line: String) {
    if pb.is_hidden() {
        pb.finish_and_clear();
    } else {
        pb.finish_with_message(line);
    }
}

fn paint(value: impl Display, style: fn(&str) -> String) -> String {
    let value = value.to_string();
    let config = current();
    if config.color && !config.json {
        style(&value)
    } else {
        value
    }
}

pub fn positive(value: impl Display) -> String {
    paint(value, |v| v.green().to_string())
}

pub fn negative(value: impl Display) -> String {
    paint(value, |v| v.red().to_string())
}

pub fn highlight(value: impl Display) -> String {
    paint(value, |v| v.cyan().to_string())
}

pub fn muted(value: impl Display) -> String {
    paint(value, |v| v.dimmed().to_string())
}
