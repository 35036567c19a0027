//! Subcommands and the helpers they share
//!
//! Every command that talks to storage resolves its configuration the same
//! way: the config file, overlaid with `--source-*` / `--destination-*` flags
//! (or their `BFS_*` environment variables), validated before any client is
//! created.

pub mod completions;
pub mod config;
pub mod diff;
pub mod folders;
pub mod sync;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use bfs_core::{
    BucketEndpoint, ConfigManager, PartialBucketEndpoint, PartialSyncConfig, Result, RootSpec,
    SyncConfig,
};
use bfs_s3::S3Bucket;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy folders missing from the destination bucket
    Sync(sync::SyncArgs),

    /// Show folders the destination is missing without writing anything
    Diff(diff::DiffArgs),

    /// List the folders of one side
    Folders(folders::FoldersArgs),

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute a subcommand
pub async fn execute(
    command: Commands,
    config_path: Option<PathBuf>,
    formatter: Formatter,
) -> ExitCode {
    let ctx = Context {
        config_path,
        formatter,
    };

    match command {
        Commands::Sync(args) => sync::execute(args, &ctx).await,
        Commands::Diff(args) => diff::execute(args, &ctx).await,
        Commands::Folders(args) => folders::execute(args, &ctx).await,
        Commands::Config(cmd) => config::execute(cmd, &ctx).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// State shared by all subcommands
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub formatter: Formatter,
}

impl Context {
    pub fn config_manager(&self) -> Result<ConfigManager> {
        match &self.config_path {
            Some(path) => Ok(ConfigManager::with_path(path)),
            None => ConfigManager::new(),
        }
    }

    /// Load, merge and validate configuration, reporting failures
    pub fn resolve_config(
        &self,
        sides: &SideArgs,
        concurrency: Option<usize>,
    ) -> std::result::Result<SyncConfig, ExitCode> {
        let resolved = self.config_manager().and_then(|manager| {
            let file = manager.load()?;
            let mut overrides = sides.overrides()?;
            overrides.concurrency = concurrency;
            file.merge(overrides).resolve()
        });

        resolved.map_err(|e| {
            self.formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        })
    }
}

/// Per-side overrides of the configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct SideArgs {
    /// Source bucket name
    #[arg(long, env = "BFS_SOURCE_BUCKET")]
    pub source_bucket: Option<String>,

    /// AWS CLI profile for the source bucket
    #[arg(long, env = "BFS_SOURCE_PROFILE")]
    pub source_profile: Option<String>,

    /// Region of the source bucket
    #[arg(long, env = "BFS_SOURCE_REGION")]
    pub source_region: Option<String>,

    /// Endpoint URL for an S3-compatible source
    #[arg(long, env = "BFS_SOURCE_ENDPOINT")]
    pub source_endpoint: Option<String>,

    /// Use path-style addressing for the source
    #[arg(long)]
    pub source_path_style: bool,

    /// Folder in the source bucket to start from (e.g. "Test/"); empty for the bucket root
    #[arg(long, env = "BFS_SOURCE_ROOT")]
    pub source_root: Option<String>,

    /// Destination bucket name
    #[arg(long, env = "BFS_DESTINATION_BUCKET")]
    pub destination_bucket: Option<String>,

    /// AWS CLI profile for the destination bucket
    #[arg(long, env = "BFS_DESTINATION_PROFILE")]
    pub destination_profile: Option<String>,

    /// Region of the destination bucket
    #[arg(long, env = "BFS_DESTINATION_REGION")]
    pub destination_region: Option<String>,

    /// Endpoint URL for an S3-compatible destination
    #[arg(long, env = "BFS_DESTINATION_ENDPOINT")]
    pub destination_endpoint: Option<String>,

    /// Use path-style addressing for the destination
    #[arg(long)]
    pub destination_path_style: bool,

    /// Folder in the destination bucket to copy into; empty for the bucket root
    #[arg(long, env = "BFS_DESTINATION_ROOT")]
    pub destination_root: Option<String>,
}

impl SideArgs {
    /// Command-line layer of the configuration
    pub fn overrides(&self) -> Result<PartialSyncConfig> {
        Ok(PartialSyncConfig {
            source: PartialBucketEndpoint {
                bucket: self.source_bucket.clone(),
                profile: self.source_profile.clone(),
                region: self.source_region.clone(),
                endpoint: self.source_endpoint.clone(),
                path_style: self.source_path_style.then_some(true),
                root: parse_root(self.source_root.as_deref())?,
            },
            destination: PartialBucketEndpoint {
                bucket: self.destination_bucket.clone(),
                profile: self.destination_profile.clone(),
                region: self.destination_region.clone(),
                endpoint: self.destination_endpoint.clone(),
                path_style: self.destination_path_style.then_some(true),
                root: parse_root(self.destination_root.as_deref())?,
            },
            ..Default::default()
        })
    }
}

fn parse_root(value: Option<&str>) -> Result<Option<RootSpec>> {
    value.map(|v| v.parse::<RootSpec>()).transpose()
}

/// Create the S3 handle for one side, reporting failures
pub async fn connect(
    endpoint: &BucketEndpoint,
    max_attempts: u32,
    side: &str,
    formatter: &Formatter,
) -> std::result::Result<S3Bucket, ExitCode> {
    S3Bucket::connect(endpoint, max_attempts)
        .await
        .map_err(|e| {
            if e.is_config() {
                formatter.error(&format!("Invalid {side} settings: {e}"));
            } else {
                formatter.error(&format!("Failed to create {side} client: {e}"));
            }
            ExitCode::from_error(&e)
        })
}

/// Spinner shown while listings run; hidden in quiet and JSON modes
pub fn spinner(formatter: &Formatter, message: &str) -> Option<ProgressBar> {
    if !formatter.show_progress() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}
