//! bfs - copy missing folder markers between S3 buckets
//!
//! Folder markers are zero-byte keys ending in `/`. `bfs sync` discovers the
//! folder tree of a source bucket (optionally below a root folder) and creates
//! every folder the destination bucket lacks, under the destination's root.

mod commands;
mod exit_code;
mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::output::{Formatter, OutputConfig};

/// Copy missing folder markers between S3 buckets
#[derive(Parser, Debug)]
#[command(name = "bfs", version, about, long_about = None)]
pub struct Cli {
    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: $BFS_CONFIG_DIR/config.toml or the platform config dir)
    #[arg(short, long, global = true, env = "BFS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let formatter = Formatter::new(OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    });

    init_logging(cli.verbose, cli.quiet, formatter.colors_enabled());

    let code = commands::execute(cli.command, cli.config, formatter).await;
    std::process::exit(code.code());
}

/// Log to stderr so stdout stays clean for command output.
///
/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8, quiet: bool, ansi: bool) {
    let level = match (quiet, verbose) {
        (true, 0) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,bfs={level},bfs_core={level},bfs_s3={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_with_overrides() {
        let cli = Cli::try_parse_from([
            "bfs",
            "--json",
            "sync",
            "--source-bucket",
            "b2-ncloud-prod",
            "--destination-bucket",
            "b1-ncloud-dev",
            "--destination-root",
            "Test/",
            "--dry-run",
            "-P",
            "4",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Sync(args) => {
                assert!(args.dry_run);
                assert_eq!(args.parallel, Some(4));
                assert_eq!(args.sides.destination_root.as_deref(), Some("Test/"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bfs", "config", "show", "-q", "-vv"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_folders_requires_side() {
        assert!(Cli::try_parse_from(["bfs", "folders"]).is_err());
        assert!(Cli::try_parse_from(["bfs", "folders", "destination", "--tree"]).is_ok());
    }
}
