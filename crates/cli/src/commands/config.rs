//! Configuration commands
//!
//! The configuration file names both buckets, their credentials profiles and
//! their roots. These commands create it and show what a sync would use.

use clap::Subcommand;
use serde::Serialize;

use bfs_core::SyncConfig;

use super::{Context, SideArgs};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration (file plus overrides)
    Show(ShowArgs),

    /// Write a commented configuration template
    Init(InitArgs),

    /// Print the path of the configuration file
    Path,
}

/// Arguments for the `config show` command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub sides: SideArgs,

    /// Print as TOML, ready to save as a configuration file
    #[arg(long)]
    pub toml: bool,
}

/// Arguments for the `config init` command
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

/// JSON output for config init/path
#[derive(Serialize)]
struct ConfigPathOutput {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Execute a config subcommand
pub async fn execute(cmd: ConfigCommands, ctx: &Context) -> ExitCode {
    match cmd {
        ConfigCommands::Show(args) => execute_show(args, ctx),
        ConfigCommands::Init(args) => execute_init(args, ctx),
        ConfigCommands::Path => execute_path(ctx),
    }
}

fn execute_show(args: ShowArgs, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;

    let config = match ctx.resolve_config(&args.sides, None) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if formatter.is_json() {
        formatter.json(&config);
        return ExitCode::Success;
    }

    if args.toml {
        return match config.to_toml() {
            Ok(text) => {
                formatter.println(text.trim_end());
                ExitCode::Success
            }
            Err(e) => {
                formatter.error(&e.to_string());
                ExitCode::from_error(&e)
            }
        };
    }

    print_config(&config, formatter);
    ExitCode::Success
}

fn print_config(config: &SyncConfig, formatter: &Formatter) {
    let label = |text: &str| formatter.style_key(&format!("{text:<12}"));

    for (side, endpoint) in [
        ("source", &config.source),
        ("destination", &config.destination),
    ] {
        formatter.println(&formatter.style_name(&format!("[{side}]")));
        formatter.println(&format!("  {} {}", label("bucket"), endpoint.bucket));
        formatter.println(&format!(
            "  {} {}",
            label("profile"),
            endpoint.profile.as_deref().unwrap_or("(default chain)")
        ));
        if let Some(region) = &endpoint.region {
            formatter.println(&format!("  {} {region}", label("region")));
        }
        if let Some(url) = &endpoint.endpoint {
            formatter.println(&format!(
                "  {} {url} {}",
                label("endpoint"),
                formatter.style_detail(if endpoint.path_style {
                    "(path style)"
                } else {
                    "(virtual hosted)"
                })
            ));
        }
        formatter.println(&format!("  {} {}", label("root"), endpoint.root));
    }

    formatter.println("");
    formatter.println(&format!("{} {}", label("concurrency"), config.concurrency));
    formatter.println(&format!("{} {}", label("max_attempts"), config.max_attempts));
}

fn execute_init(args: InitArgs, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;

    let manager = match ctx.config_manager() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    match manager.init(args.force) {
        Ok(()) => {
            let path = manager.path().display().to_string();
            if formatter.is_json() {
                formatter.json(&ConfigPathOutput {
                    path,
                    message: Some("Configuration template written".to_string()),
                });
            } else {
                formatter.success(&format!("Configuration template written to {path}"));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

fn execute_path(ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;

    match ctx.config_manager() {
        Ok(manager) => {
            let path = manager.path().display().to_string();
            if formatter.is_json() {
                formatter.json(&ConfigPathOutput {
                    path,
                    message: None,
                });
            } else {
                formatter.println(&path);
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}
