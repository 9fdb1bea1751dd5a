//! Config command handlers: show effective configuration.

use anyhow::Result;
use scidb_core::{StaticPreferences, resolve_endpoint};

use crate::app::config_runtime::{resolve_settings, verbosity_label};
use crate::app_config::load_default_file_config;
use crate::cli::FetchArgs;

pub fn run_config_show_command(verbose: u8, quiet: bool) -> Result<()> {
    let loaded_config = load_default_file_config()?;
    let effective = resolve_settings(
        verbose,
        quiet,
        &FetchArgs::default(),
        loaded_config.config.as_ref(),
    )?;
    let endpoint = resolve_endpoint(&StaticPreferences::new(effective.endpoint.clone()));

    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded_config.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("endpoint = {endpoint}");
    println!("output_dir = {}", effective.output_dir.display());
    println!(
        "connect_timeout_secs = {}",
        effective.timeouts.connect.as_secs()
    );
    println!(
        "request_timeout_secs = {}",
        effective.timeouts.request.as_secs()
    );
    println!("max_unwrap_depth = {}", effective.max_unwrap_depth);
    println!("open_browser = {}", effective.open_browser);
    println!(
        "verbosity = {}",
        verbosity_label(effective.verbose, effective.quiet)
    );

    Ok(())
}
