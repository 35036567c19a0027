//! One-way folder sync
//!
//! Compares the source and destination folder sets in root-relative
//! coordinates and creates the folders the destination lacks. Extra folders
//! in the destination are left alone.
//!
//! A failed create aborts the sync. Folders written before the failure stay
//! in place; running the sync again picks up where it stopped.

use futures::{StreamExt, stream};

use crate::enumerate::{EnumerateOptions, FolderSet, enumerate_folders_with};
use crate::error::Result;
use crate::root::RootSpec;
use crate::traits::FolderStore;

/// Options for a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute the missing folders without writing anything
    pub dry_run: bool,

    /// Listings and creates in flight at once
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: 1,
        }
    }
}

/// Outcome of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Root-relative folders present in the source but not the destination
    pub missing: Vec<String>,

    /// Absolute destination keys written, in completion order
    pub created: Vec<String>,

    pub dry_run: bool,
}

impl SyncReport {
    pub fn is_in_sync(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Folders in `source` that `destination` lacks, in ascending order
pub fn missing_folders(source: &FolderSet, destination: &FolderSet) -> Vec<String> {
    source.difference(destination).cloned().collect()
}

/// Enumerate both sides and return the missing root-relative folders
pub async fn plan_sync(
    source: &dyn FolderStore,
    destination: &dyn FolderStore,
    source_root: &RootSpec,
    destination_root: &RootSpec,
    concurrency: usize,
) -> Result<Vec<String>> {
    let options = EnumerateOptions { concurrency };

    let source_folders =
        enumerate_folders_with(source, source_root.name(), source_root, options).await?;
    let destination_folders =
        enumerate_folders_with(destination, destination_root.name(), destination_root, options)
            .await?;

    let missing = missing_folders(&source_folders, &destination_folders);

    tracing::info!(
        source = source_folders.len(),
        destination = destination_folders.len(),
        missing = missing.len(),
        "Compared folder sets"
    );

    Ok(missing)
}

/// Copy folders missing from `destination` over from `source`.
///
/// The returned `missing` list is root-relative; `created` holds the keys
/// actually written, re-prefixed with the destination root when it is custom.
pub async fn sync_folders(
    source: &dyn FolderStore,
    destination: &dyn FolderStore,
    source_root: &RootSpec,
    destination_root: &RootSpec,
    options: SyncOptions,
) -> Result<SyncReport> {
    let concurrency = options.concurrency.max(1);
    let missing = plan_sync(
        source,
        destination,
        source_root,
        destination_root,
        concurrency,
    )
    .await?;

    if options.dry_run || missing.is_empty() {
        return Ok(SyncReport {
            missing,
            created: Vec::new(),
            dry_run: options.dry_run,
        });
    }

    let created = create_folders(destination, destination_root, &missing, concurrency).await?;

    tracing::info!(created = created.len(), "Sync complete");

    Ok(SyncReport {
        missing,
        created,
        dry_run: false,
    })
}

async fn create_folders(
    destination: &dyn FolderStore,
    root: &RootSpec,
    missing: &[String],
    concurrency: usize,
) -> Result<Vec<String>> {
    let mut created = Vec::with_capacity(missing.len());

    let mut writes = stream::iter(missing)
        .map(|relative| {
            let key = root.write_target(relative);
            async move { destination.create_empty_object(&key).await.map(|()| key) }
        })
        .buffer_unordered(concurrency);

    while let Some(result) = writes.next().await {
        match result {
            Ok(key) => {
                tracing::debug!(key = %key, "Created folder marker");
                created.push(key);
            }
            Err(e) => {
                tracing::error!(
                    created = created.len(),
                    remaining = missing.len() - created.len(),
                    error = %e,
                    "Folder creation failed, aborting sync"
                );
                return Err(e);
            }
        }
    }

    Ok(created)
}
