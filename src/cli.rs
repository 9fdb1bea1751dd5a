//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Fetch PDFs for DOIs through a shadow-library mirror.
///
/// Items are processed one at a time. When a mirror answers with a captcha
/// or an unexpected page, the run stops and the page is opened in a browser
/// so the request can be finished by hand.
#[derive(Parser, Debug)]
#[command(name = "scidb")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch PDFs for identifiers given as arguments or on stdin
    Fetch(FetchArgs),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

/// Arguments for `scidb fetch`.
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Identifiers (DOIs). When omitted, stdin is read: one `identifier[<TAB>title]` per line
    #[arg(value_name = "IDENTIFIER")]
    pub identifiers: Vec<String>,

    /// Mirror endpoint base URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Directory receiving downloaded PDFs
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print URLs that need manual attention instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Request timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Maximum embedded-frame hops per item (1-20)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=20))]
    pub max_unwrap_depth: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fetch_args(cli: Cli) -> FetchArgs {
        match cli.command {
            Command::Fetch(args) => args,
            Command::Config { .. } => panic!("expected fetch command"),
        }
    }

    #[test]
    fn test_cli_fetch_defaults() {
        let cli = Cli::try_parse_from(["scidb", "fetch"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        let args = fetch_args(cli);
        assert!(args.identifiers.is_empty());
        assert!(args.endpoint.is_none());
        assert!(args.output_dir.is_none());
        assert!(!args.no_browser);
        assert!(args.timeout.is_none());
        assert!(args.max_unwrap_depth.is_none());
    }

    #[test]
    fn test_cli_fetch_positional_identifiers() {
        let cli = Cli::try_parse_from(["scidb", "fetch", "10.1/a", "10.1/b"]).unwrap();
        assert_eq!(fetch_args(cli).identifiers, vec!["10.1/a", "10.1/b"]);
    }

    #[test]
    fn test_cli_fetch_all_flags() {
        let cli = Cli::try_parse_from([
            "scidb",
            "fetch",
            "--endpoint",
            "https://mirror.example/",
            "-o",
            "papers",
            "--no-browser",
            "--timeout",
            "45",
            "--max-unwrap-depth",
            "3",
        ])
        .unwrap();
        let args = fetch_args(cli);
        assert_eq!(args.endpoint.as_deref(), Some("https://mirror.example/"));
        assert_eq!(args.output_dir, Some(PathBuf::from("papers")));
        assert!(args.no_browser);
        assert_eq!(args.timeout, Some(45));
        assert_eq!(args.max_unwrap_depth, Some(3));
    }

    #[test]
    fn test_cli_global_verbosity_after_subcommand() {
        let cli = Cli::try_parse_from(["scidb", "fetch", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["scidb", "-q", "fetch"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_timeout_zero_rejected() {
        let err = Cli::try_parse_from(["scidb", "fetch", "--timeout", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_max_unwrap_depth_over_max_rejected() {
        let err =
            Cli::try_parse_from(["scidb", "fetch", "--max-unwrap-depth", "21"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_config_show() {
        let cli = Cli::try_parse_from(["scidb", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                command: ConfigCommand::Show
            }
        ));
    }

    #[test]
    fn test_cli_missing_subcommand_returns_error() {
        assert!(Cli::try_parse_from(["scidb"]).is_err());
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Cli::try_parse_from(["scidb", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Cli::try_parse_from(["scidb", "fetch", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
