//! bfs-core: Core library for bucket-folder-sync
//!
//! This crate provides:
//! - Root specifications and configuration management
//! - The FolderStore trait for the two storage operations the sync needs
//! - Recursive folder discovery over paginated, delimiter-grouped listings
//! - The one-way folder sync engine
//!
//! It does not depend on any S3 SDK; backends implement [`FolderStore`].

pub mod config;
pub mod enumerate;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod root;
pub mod sync;
pub mod traits;

pub use config::{BucketEndpoint, ConfigManager, PartialBucketEndpoint, PartialSyncConfig, SyncConfig};
pub use enumerate::{EnumerateOptions, FolderSet, enumerate_folders, enumerate_folders_with};
pub use error::{Error, Result};
pub use root::RootSpec;
pub use sync::{SyncOptions, SyncReport, missing_folders, plan_sync, sync_folders};
pub use traits::{FolderStore, PrefixPage};
