//! sync command - Copy missing folders from source to destination
//!
//! Creates an empty marker in the destination for every source folder the
//! destination lacks. Nothing is ever removed from the destination.

use clap::Args;
use jiff::Timestamp;
use serde::Serialize;

use bfs_core::{SyncOptions, SyncReport, sync_folders};

use super::{Context, SideArgs, connect, spinner};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Copy folders missing from the destination bucket
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub sides: SideArgs,

    /// Dry run (show what would be created without creating it)
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Number of listings and creates in flight at once
    #[arg(short = 'P', long)]
    pub parallel: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SyncOutput {
    source: String,
    destination: String,
    /// Root-relative folders the destination was missing
    missing: Vec<String>,
    /// Destination keys written
    created: Vec<String>,
    dry_run: bool,
    started_at: Timestamp,
    finished_at: Timestamp,
}

/// Execute the sync command
pub async fn execute(args: SyncArgs, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;
    let started_at = Timestamp::now();

    let config = match ctx.resolve_config(&args.sides, args.parallel) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let source = match connect(&config.source, config.max_attempts, "source", formatter).await {
        Ok(c) => c,
        Err(code) => return code,
    };

    let destination =
        match connect(&config.destination, config.max_attempts, "destination", formatter).await {
            Ok(c) => c,
            Err(code) => return code,
        };

    let source_location = config.source.location();
    let destination_location = config.destination.location();
    tracing::info!(
        source = %source_location,
        destination = %destination_location,
        dry_run = args.dry_run,
        "Starting folder sync"
    );

    let progress = spinner(formatter, "Comparing folders...");
    let options = SyncOptions {
        dry_run: args.dry_run,
        concurrency: config.concurrency,
    };

    let result = sync_folders(
        &source,
        &destination,
        &config.source.root,
        &config.destination.root,
        options,
    )
    .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&format!("Sync failed: {e}"));
            if e.is_remote_access() && !args.dry_run {
                formatter.warning(
                    "Folders created before the failure are kept; run sync again to create the rest",
                );
            }
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        let output = SyncOutput {
            source: source_location,
            destination: destination_location,
            missing: report.missing,
            created: report.created,
            dry_run: report.dry_run,
            started_at,
            finished_at: Timestamp::now(),
        };
        formatter.json(&output);
    } else {
        print_report(
            &report,
            &config.destination.root.write_target(""),
            formatter,
        );
    }

    ExitCode::Success
}

fn print_report(report: &SyncReport, destination_prefix: &str, formatter: &Formatter) {
    if report.is_in_sync() {
        formatter.success("Destination already has every source folder.");
        return;
    }

    if report.dry_run {
        formatter.warning("Dry run mode - no changes will be made");
        formatter.println(&format!(
            "Would create {} folder(s):",
            report.missing.len()
        ));
        for relative in &report.missing {
            let key = format!("{destination_prefix}{relative}");
            formatter.println(&format!(
                "  {} {}",
                formatter.style_added("+"),
                formatter.style_dir(&key)
            ));
        }
        return;
    }

    for key in &report.created {
        formatter.println(&format!(
            "{} {}",
            formatter.style_added("+"),
            formatter.style_dir(key)
        ));
    }

    formatter.println("");
    formatter.success(&format!(
        "Sync complete: {} folder(s) created",
        report.created.len()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_output_serialization() {
        let output = SyncOutput {
            source: "b2-ncloud-prod/".to_string(),
            destination: "b1-ncloud-dev/Test/".to_string(),
            missing: vec!["a/".to_string(), "a/b/".to_string()],
            created: vec!["Test/a/".to_string(), "Test/a/b/".to_string()],
            dry_run: false,
            started_at: Timestamp::UNIX_EPOCH,
            finished_at: Timestamp::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["missing"][1], "a/b/");
        assert_eq!(json["created"][0], "Test/a/");
        assert_eq!(json["dry_run"], false);
        assert_eq!(json["started_at"], "1970-01-01T00:00:00Z");
    }
}
