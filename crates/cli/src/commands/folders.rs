//! folders command - List the folders of one side
//!
//! Prints the root-relative folder set exactly as the sync compares it,
//! either one path per line or as a tree.

use std::collections::BTreeMap;

use clap::{Args, ValueEnum};
use serde::Serialize;

use bfs_core::{EnumerateOptions, FolderSet, enumerate_folders_with};

use super::{Context, SideArgs, connect, spinner};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Destination => "destination",
        }
    }
}

/// List the folders of one side
#[derive(Args, Debug)]
pub struct FoldersArgs {
    /// Which configured bucket to list
    #[arg(value_enum)]
    pub side: Side,

    #[command(flatten)]
    pub sides: SideArgs,

    /// Display as a tree
    #[arg(short, long)]
    pub tree: bool,

    /// Number of listings in flight at once
    #[arg(short = 'P', long)]
    pub parallel: Option<usize>,
}

#[derive(Debug, Serialize)]
struct FoldersOutput {
    bucket: String,
    root: String,
    folders: Vec<String>,
    count: usize,
}

/// Execute the folders command
pub async fn execute(args: FoldersArgs, ctx: &Context) -> ExitCode {
    let formatter = &ctx.formatter;

    let config = match ctx.resolve_config(&args.sides, args.parallel) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let endpoint = match args.side {
        Side::Source => &config.source,
        Side::Destination => &config.destination,
    };

    let client = match connect(endpoint, config.max_attempts, args.side.as_str(), formatter).await
    {
        Ok(c) => c,
        Err(code) => return code,
    };

    let progress = spinner(formatter, &format!("Listing {}...", endpoint.location()));
    let result = enumerate_folders_with(
        &client,
        endpoint.root.name(),
        &endpoint.root,
        EnumerateOptions {
            concurrency: config.concurrency,
        },
    )
    .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let folders = match result {
        Ok(f) => f,
        Err(e) => {
            formatter.error(&format!("Failed to list folders: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        let output = FoldersOutput {
            bucket: endpoint.bucket.clone(),
            root: endpoint.root.name().to_string(),
            count: folders.len(),
            folders: folders.into_iter().collect(),
        };
        formatter.json(&output);
        return ExitCode::Success;
    }

    if args.tree {
        let tree = build_tree(&folders);
        formatter.println(&formatter.style_name(&endpoint.location()));
        print_tree(&tree, "", formatter);
    } else {
        for folder in &folders {
            formatter.println(&formatter.style_dir(folder));
        }
    }

    formatter.println("");
    formatter.println(&format!("{} folder(s)", folders.len()));

    ExitCode::Success
}

#[derive(Debug, Default, PartialEq, Eq)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

/// Nest folder paths by segment: `a/b/` becomes `a` -> `b`
fn build_tree(folders: &FolderSet) -> TreeNode {
    let mut root = TreeNode::default();

    for folder in folders {
        let mut node = &mut root;
        for part in folder.split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    root
}

fn print_tree(node: &TreeNode, prefix: &str, formatter: &Formatter) {
    let count = node.children.len();

    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i == count - 1;
        let connector = if is_last { "└── " } else { "├── " };

        formatter.println(&format!(
            "{}{}",
            formatter.style_tree_branch(&format!("{prefix}{connector}")),
            formatter.style_dir(&format!("{name}/"))
        ));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        print_tree(child, &child_prefix, formatter);
    }
}
