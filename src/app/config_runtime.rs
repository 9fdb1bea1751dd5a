//! Merges command-line flags, the config file and built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use scidb_core::{DEFAULT_MAX_UNWRAP_DEPTH, HttpTimeouts, PipelineConfig};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::FetchArgs;

/// Effective settings for one invocation.
#[derive(Debug, Clone)]
pub(crate) struct EffectiveSettings {
    /// Endpoint preference; `None` lets the library fall back to its default.
    pub(crate) endpoint: Option<String>,
    pub(crate) output_dir: PathBuf,
    pub(crate) timeouts: HttpTimeouts,
    pub(crate) max_unwrap_depth: usize,
    pub(crate) open_browser: bool,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
}

impl EffectiveSettings {
    pub(crate) fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_unwrap_depth: self.max_unwrap_depth,
            ..PipelineConfig::default()
        }
    }
}

/// Applies precedence: command line, then config file, then defaults.
pub(crate) fn resolve_settings(
    verbose: u8,
    quiet: bool,
    args: &FetchArgs,
    file_config: Option<&FileConfig>,
) -> Result<EffectiveSettings> {
    let defaults = FileConfig::default();
    let file = file_config.unwrap_or(&defaults);

    let mut timeouts = HttpTimeouts::default();
    if let Some(secs) = file.connect_timeout_secs {
        timeouts.connect = Duration::from_secs(secs);
    }
    if let Some(secs) = args.timeout.or(file.request_timeout_secs) {
        timeouts.request = Duration::from_secs(secs);
    }

    let max_unwrap_depth = match args.max_unwrap_depth.or(file.max_unwrap_depth) {
        Some(depth) => usize::try_from(depth).context("max_unwrap_depth out of range")?,
        None => DEFAULT_MAX_UNWRAP_DEPTH,
    };

    let (verbose, quiet) = if verbose > 0 || quiet {
        (verbose, quiet)
    } else {
        match file.verbosity {
            Some(VerbositySetting::Verbose) => (1, false),
            Some(VerbositySetting::Debug) => (2, false),
            Some(VerbositySetting::Quiet) => (0, true),
            Some(VerbositySetting::Default) | None => (0, false),
        }
    };

    Ok(EffectiveSettings {
        endpoint: args.endpoint.clone().or_else(|| file.endpoint.clone()),
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| file.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(".")),
        timeouts,
        max_unwrap_depth,
        open_browser: !args.no_browser && file.open_browser.unwrap_or(true),
        verbose,
        quiet,
    })
}

pub(crate) fn resolve_default_log_level(settings: &EffectiveSettings) -> &'static str {
    if settings.quiet {
        "error"
    } else {
        match settings.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Explicit `-v`/`-q` flags win over `RUST_LOG`.
pub(crate) fn should_force_cli_log_level(verbose: u8, quiet: bool) -> bool {
    verbose > 0 || quiet
}

pub(crate) fn verbosity_label(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        VerbositySetting::Quiet.as_str()
    } else if verbose == 0 {
        VerbositySetting::Default.as_str()
    } else if verbose == 1 {
        VerbositySetting::Verbose.as_str()
    } else {
        VerbositySetting::Debug.as_str()
    }
}
