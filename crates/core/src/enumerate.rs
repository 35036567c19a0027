//! Folder tree enumeration
//!
//! Discovers every folder under a prefix by walking delimiter-grouped listings
//! one level at a time. Listings return their children and share no state;
//! the walk owns the result set and extends it between levels.

use std::collections::BTreeSet;

use futures::{StreamExt, TryStreamExt, stream};

use crate::error::{Error, Result};
use crate::root::RootSpec;
use crate::traits::FolderStore;

/// Root-relative folder paths, ordered for stable reporting
pub type FolderSet = BTreeSet<String>;

/// Options for folder enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerateOptions {
    /// Listings in flight at once across the whole walk. 1 is sequential.
    pub concurrency: usize,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Discover every folder below `start_prefix`, expressed relative to `root`.
///
/// An empty result is valid. A prefix with no objects at all and a prefix
/// with objects but no subfolders both return an empty set and are only
/// distinguished in the log.
pub async fn enumerate_folders(
    store: &dyn FolderStore,
    start_prefix: &str,
    root: &RootSpec,
) -> Result<FolderSet> {
    enumerate_folders_with(store, start_prefix, root, EnumerateOptions::default()).await
}

/// [`enumerate_folders`] with explicit options.
///
/// The tree is walked one level at a time. All prefixes of a level share a
/// single pool of `concurrency` listings, so the bound holds for the whole
/// walk regardless of depth.
pub async fn enumerate_folders_with(
    store: &dyn FolderStore,
    start_prefix: &str,
    root: &RootSpec,
    options: EnumerateOptions,
) -> Result<FolderSet> {
    let concurrency = options.concurrency.max(1);
    let listing = list_children(store, start_prefix).await?;

    if !listing.has_objects {
        tracing::warn!(prefix = start_prefix, "Prefix contains no objects");
    } else if listing.children.is_empty() {
        tracing::info!(prefix = start_prefix, "Prefix contains no subfolders");
    }

    let mut folders = FolderSet::new();
    let mut frontier = listing.children;
    let mut depth = 0usize;

    while !frontier.is_empty() {
        depth += 1;
        folders.extend(frontier.iter().map(|prefix| root.relative(prefix)));

        frontier = stream::iter(frontier)
            .map(|prefix| async move { list_children(store, &prefix).await })
            .buffer_unordered(concurrency)
            .try_fold(Vec::new(), |mut next, listing| async move {
                next.extend(listing.children);
                Ok::<_, Error>(next)
            })
            .await?;

        tracing::trace!(depth, next = frontier.len(), "Listed folder level");
    }

    tracing::debug!(
        prefix = start_prefix,
        folders = folders.len(),
        depth,
        "Enumerated folders"
    );

    Ok(folders)
}

struct Children {
    children: Vec<String>,
    has_objects: bool,
}

/// Collect the immediate child prefixes of `prefix` across all pages
async fn list_children(store: &dyn FolderStore, prefix: &str) -> Result<Children> {
    let mut children = Vec::new();
    let mut has_objects = false;
    let mut continuation_token: Option<String> = None;

    loop {
        let page = store
            .list_child_prefixes(prefix, continuation_token.take())
            .await?;
        has_objects |= page.has_objects;

        for child in page.prefixes {
            // A child equal to or outside the parent would never terminate
            if child == prefix || !child.starts_with(prefix) {
                tracing::debug!(prefix, child = %child, "Skipping unexpected child prefix");
                continue;
            }
            children.push(child);
        }

        match page.continuation_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }

    Ok(Children {
        children,
        has_objects,
    })
}
