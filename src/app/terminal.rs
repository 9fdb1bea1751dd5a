//! Terminal presentation: tracing setup, progress lines, manual URL hand-off.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use scidb_core::{ProgressLine, ProgressSink, Severity, UrlOpener};

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_use_spinner(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

pub(crate) fn init_tracing(default_level: &str, force_cli_level: bool, no_color: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

/// Renders one progress line for plain output.
pub(crate) fn format_line(line: &ProgressLine) -> String {
    let marker = match line.severity {
        Severity::Default => "  ",
        Severity::Success => "ok",
        Severity::Fail => "!!",
    };
    match line.item {
        Some(index) => format!("{marker} [{}] {}", index + 1, line.text),
        None => format!("{marker} {}", line.text),
    }
}

/// Progress sink printing to stdout, with an optional spinner for in-flight items.
///
/// Item lines of default severity only update the spinner; every other line
/// is printed above it, so each item leaves exactly its outcome behind.
#[derive(Clone)]
pub(crate) struct TerminalProgress {
    spinner: Option<ProgressBar>,
}

impl TerminalProgress {
    pub(crate) fn new(use_spinner: bool) -> Self {
        let spinner = use_spinner.then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        });
        Self { spinner }
    }

    pub(crate) fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }

    fn print(&self, text: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| println!("{text}")),
            None => println!("{text}"),
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn report(&self, line: ProgressLine) {
        if let (Some(spinner), Some(_), Severity::Default) = (&self.spinner, line.item, line.severity)
        {
            spinner.set_message(line.text);
            return;
        }
        self.print(&format_line(&line));
    }
}

/// Opener used with `--no-browser`: prints the URL for the user to open.
#[derive(Clone)]
pub(crate) struct PrintUrl {
    progress: TerminalProgress,
}

impl PrintUrl {
    pub(crate) fn new(progress: TerminalProgress) -> Self {
        Self { progress }
    }
}

impl UrlOpener for PrintUrl {
    fn open(&self, url: &str) {
        self.progress.print(&format!("-> open manually: {url}"));
    }
}
