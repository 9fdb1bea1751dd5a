use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scidb_core::{
    BatchRunner, DirectoryAttachments, PageClient, Retriever, StaticPreferences, SystemBrowser,
    UrlOpener,
};
use tracing::{debug, info};

use crate::app::{config_runtime, exit_handler, input_processor, terminal};
use crate::app_config::load_default_file_config;
use crate::cli::{Cli, Command, ConfigCommand, FetchArgs};
use crate::{ProcessExit, commands};

pub(crate) async fn run_scidb() -> Result<ProcessExit> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Config {
            command: ConfigCommand::Show,
        } => {
            let no_color = terminal::no_color_env_requested() || terminal::is_dumb_terminal();
            terminal::init_tracing("info", false, no_color);
            commands::run_config_show_command(cli.verbose, cli.quiet)?;
            Ok(ProcessExit::Success)
        }
        Command::Fetch(args) => run_fetch(cli.verbose, cli.quiet, args).await,
    }
}

async fn run_fetch(verbose: u8, quiet: bool, args: &FetchArgs) -> Result<ProcessExit> {
    let loaded_config = load_default_file_config()?;
    let settings =
        config_runtime::resolve_settings(verbose, quiet, args, loaded_config.config.as_ref())?;

    let default_level = config_runtime::resolve_default_log_level(&settings);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(verbose, quiet);
    let no_color = terminal::no_color_env_requested() || terminal::is_dumb_terminal();
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    debug!(?settings, "Effective settings resolved");
    info!("scidb starting");

    let items = input_processor::collect_items(&args.identifiers)?;
    info!(items = items.len(), "Collected items");

    let client = PageClient::new(settings.timeouts).context("Failed to initialize HTTP client")?;
    let retriever = Retriever::new(client, settings.pipeline_config());

    let progress = terminal::TerminalProgress::new(terminal::should_use_spinner(
        io::stderr().is_terminal(),
        settings.quiet,
        terminal::is_dumb_terminal(),
    ));
    let opener: Arc<dyn UrlOpener> = if settings.open_browser {
        Arc::new(SystemBrowser)
    } else {
        Arc::new(terminal::PrintUrl::new(progress.clone()))
    };

    let runner = BatchRunner::new(
        retriever,
        Arc::new(StaticPreferences::new(settings.endpoint.clone())),
        Arc::new(DirectoryAttachments::new(settings.output_dir.clone())),
        opener,
        Arc::new(progress.clone()),
    );

    let state = runner.run(&items).await;
    progress.finish();

    Ok(exit_handler::determine_exit_outcome(state))
}
