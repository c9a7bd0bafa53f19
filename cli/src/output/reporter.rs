//! `ConsoleReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly. Concurrent acquisitions all write through
//! one reporter; when a spinner is live, lines are routed through it so they
//! print above the ticker instead of tearing it.

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ! {message}"` (suppressed when `ctx.quiet`)
///
/// All lines land on stderr so `--json` and piped env-block output stay
/// machine-readable.
pub struct ConsoleReporter<'a> {
    ctx: &'a OutputContext,
    bar: Option<ProgressBar>,
}

impl<'a> ConsoleReporter<'a> {
    /// Create a reporter without a spinner.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx, bar: None }
    }

    /// Create a reporter with a live spinner when the terminal supports it.
    #[must_use]
    pub fn with_spinner(ctx: &'a OutputContext, msg: &str) -> Self {
        let bar = ctx.show_progress().then(|| progress::spinner(msg));
        Self { ctx, bar }
    }

    /// Stop the spinner, leaving any printed lines in place.
    pub fn clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    // Progress lines go to stderr, matching the spinner's draw target.
    // Stdout stays reserved for the credential block and reports.
    fn emit(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl ProgressReporter for ConsoleReporter<'_> {
    fn step(&self, message: &str) {
        if !self.ctx.quiet {
            self.emit(format!("  {} {message}", "→".cyan()));
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            self.emit(format!("  {} {message}", "✓".green()));
        }
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            self.emit(format!("  {} {message}", "!".yellow()));
        }
    }
}
