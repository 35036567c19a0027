//! bfs-s3: aws-sdk-s3 backend for bucket-folder-sync
//!
//! Provides [`S3Bucket`], the `FolderStore` implementation used by the `bfs`
//! binary.

mod client;

pub use client::S3Bucket;
