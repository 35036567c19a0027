//! diff command - Compare the folder trees of source and destination
//!
//! Lists folders present in the source but absent from the destination,
//! in root-relative form. Nothing is written.

use clap::Args;
use serde::Serialize;

use bfs_core::plan_sync;

use super::{Context, SideArgs, connect, spinner};
use crate::exit_code::ExitCode;

/// Show folders the destination is missing
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub sides: SideArgs,

    /// Number of listings in flight at once
    #[arg(short = 'P', long)]
    pub parallel: Option<usize>,
}

#[derive(Debug, Serialize)]
struct DiffOutput {
    source: String,
    destination: String,
    missing: Vec<String>,
    in_sync: bool,
}

/// Execute the diff command
///
/// Exits with `GeneralError` when folders are missing, like `diff(1)`.
pub async fn execute(args: DiffArgs, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;

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

    let progress = spinner(formatter, "Comparing folders...");
    let result = plan_sync(
        &source,
        &destination,
        &config.source.root,
        &config.destination.root,
        config.concurrency,
    )
    .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let missing = match result {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to compare folders: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let in_sync = missing.is_empty();

    if formatter.is_json() {
        let output = DiffOutput {
            source: config.source.location(),
            destination: config.destination.location(),
            missing,
            in_sync,
        };
        formatter.json(&output);
    } else {
        for relative in &missing {
            formatter.println(&format!("< {}", formatter.style_dir(relative)));
        }

        if !in_sync {
            formatter.println("");
        }
        formatter.println(&format!(
            "Summary: {} folder(s) in {} missing from {}",
            missing.len(),
            formatter.style_name(&config.source.location()),
            formatter.style_name(&config.destination.location())
        ));
    }

    if in_sync {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}
