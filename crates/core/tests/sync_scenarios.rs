//! End-to-end sync scenarios against in-memory buckets

use std::collections::BTreeSet;

use bfs_core::memory::MemoryBucket;
use bfs_core::{
    Error, FolderSet, RootSpec, SyncOptions, enumerate_folders, enumerate_folders_with,
    EnumerateOptions, missing_folders, sync_folders,
};

fn set(items: &[&str]) -> FolderSet {
    items.iter().map(|s| s.to_string()).collect()
}

async fn sync(
    source: &MemoryBucket,
    destination: &MemoryBucket,
    source_root: &RootSpec,
    destination_root: &RootSpec,
) -> Vec<String> {
    sync_folders(
        source,
        destination,
        source_root,
        destination_root,
        SyncOptions::default(),
    )
    .await
    .unwrap()
    .missing
}

#[tokio::test]
async fn test_sync_then_resync_is_empty() {
    let source = MemoryBucket::with_keys("prod", ["a/", "a/b/", "c/"]);
    let destination = MemoryBucket::with_keys("dev", ["a/"]);
    let root = RootSpec::bucket();

    let missing = sync(&source, &destination, &root, &root).await;
    assert_eq!(missing, vec!["a/b/", "c/"]);

    let after = enumerate_folders(&destination, "", &root).await.unwrap();
    assert_eq!(after, set(&["a/", "a/b/", "c/"]));

    let missing = sync(&source, &destination, &root, &root).await;
    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_sync_into_custom_destination_root() {
    let source = MemoryBucket::with_keys("prod", ["a/", "a/b/", "c/"]);
    let destination = MemoryBucket::new("dev");
    let destination_root = RootSpec::custom("T/").unwrap();

    let before = enumerate_folders(&destination, destination_root.name(), &destination_root)
        .await
        .unwrap();
    assert!(before.is_empty());

    let missing = sync(&source, &destination, &RootSpec::bucket(), &destination_root).await;
    assert_eq!(missing, vec!["a/", "a/b/", "c/"]);

    let written: BTreeSet<String> = destination.writes().into_iter().collect();
    assert_eq!(written, set(&["T/a/", "T/a/b/", "T/c/"]));

    let after = enumerate_folders(&destination, destination_root.name(), &destination_root)
        .await
        .unwrap();
    assert_eq!(after, set(&["a/", "a/b/", "c/"]));

    let missing = sync(&source, &destination, &RootSpec::bucket(), &destination_root).await;
    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_sync_between_custom_roots() {
    let source = MemoryBucket::with_keys(
        "prod",
        ["Test/", "Test/sub/", "Test/sub/deep/", "Other/ignored/"],
    );
    let destination = MemoryBucket::with_keys("dev", ["Copy/", "Copy/sub/"]);
    let source_root = RootSpec::custom("Test/").unwrap();
    let destination_root = RootSpec::custom("Copy/").unwrap();

    let missing = sync(&source, &destination, &source_root, &destination_root).await;
    assert_eq!(missing, vec!["sub/deep/"]);
    assert_eq!(destination.writes(), vec!["Copy/sub/deep/"]);
}

#[tokio::test]
async fn test_root_stripping() {
    let bucket = MemoryBucket::with_keys("dev", ["Test/", "Test/sub/"]);
    let root = RootSpec::custom("Test/").unwrap();

    let folders = enumerate_folders(&bucket, root.name(), &root).await.unwrap();
    assert!(folders.contains("sub/"));
    assert!(!folders.contains("Test/sub/"));
}

#[tokio::test]
async fn test_bucket_root_passthrough() {
    let bucket = MemoryBucket::with_keys("dev", ["Test/", "Test/sub/"]);
    let root = RootSpec::bucket();

    let folders = enumerate_folders(&bucket, root.name(), &root).await.unwrap();
    assert_eq!(folders, set(&["Test/", "Test/sub/"]));
}

#[tokio::test]
async fn test_empty_bucket_is_empty_set() {
    let bucket = MemoryBucket::new("empty");
    let folders = enumerate_folders(&bucket, "", &RootSpec::bucket())
        .await
        .unwrap();
    assert!(folders.is_empty());
}

#[tokio::test]
async fn test_files_imply_folders() {
    let bucket = MemoryBucket::with_keys("dev", ["docs/readme.txt", "docs/img/logo.png", "top.txt"]);
    let folders = enumerate_folders(&bucket, "", &RootSpec::bucket())
        .await
        .unwrap();
    assert_eq!(folders, set(&["docs/", "docs/img/"]));
}

#[tokio::test]
async fn test_pagination_across_levels() {
    let keys: Vec<String> = (0..25)
        .flat_map(|i| vec![format!("dir{i:02}/"), format!("dir{i:02}/child/")])
        .collect();
    let bucket = MemoryBucket::with_keys("paged", keys).page_size(4);

    let folders = enumerate_folders(&bucket, "", &RootSpec::bucket())
        .await
        .unwrap();
    assert_eq!(folders.len(), 50);
    assert!(folders.contains("dir24/child/"));
    // 7 pages at the top, one per dirNN/, one per dirNN/child/
    assert_eq!(bucket.list_calls(), 7 + 25 + 25);
}

#[tokio::test]
async fn test_missing_is_set_difference() {
    let a = set(&["a/", "b/", "b/c/", "d/"]);
    let b = set(&["b/", "d/", "e/"]);

    let source = MemoryBucket::with_keys("src", a.iter().cloned());
    let destination = MemoryBucket::with_keys("dst", b.iter().cloned());
    let root = RootSpec::bucket();

    let report = sync_folders(
        &source,
        &destination,
        &root,
        &root,
        SyncOptions {
            dry_run: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(report.missing, missing_folders(&a, &b));
    assert_eq!(report.missing, vec!["a/", "b/c/"]);
    assert!(destination.writes().is_empty());
}

#[tokio::test]
async fn test_partial_failure_then_rerun_reconciles() {
    let source = MemoryBucket::with_keys("prod", ["a/", "b/", "c/"]);
    let destination = MemoryBucket::new("dev");
    destination.fail_writes_to("b/");
    let root = RootSpec::bucket();

    let result = sync_folders(&source, &destination, &root, &root, SyncOptions::default()).await;
    assert!(matches!(result, Err(Error::Network(_))));
    assert_eq!(destination.writes(), vec!["a/"]);

    let healthy = MemoryBucket::with_keys("dev", destination.keys());
    let missing = sync(&source, &healthy, &root, &root).await;
    assert_eq!(missing, vec!["b/", "c/"]);

    let missing = sync(&source, &healthy, &root, &root).await;
    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_parallel_sync_matches_sequential() {
    let keys = ["a/", "a/1/", "a/2/", "b/", "b/1/", "b/1/x/", "c/"];

    let sequential_dst = MemoryBucket::new("seq");
    let parallel_dst = MemoryBucket::new("par");
    let source = MemoryBucket::with_keys("src", keys);
    let root = RootSpec::bucket();

    let sequential = sync_folders(&source, &sequential_dst, &root, &root, SyncOptions::default())
        .await
        .unwrap();
    let parallel = sync_folders(
        &source,
        &parallel_dst,
        &root,
        &root,
        SyncOptions {
            concurrency: 4,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(sequential.missing, parallel.missing);
    assert_eq!(sequential_dst.keys(), parallel_dst.keys());

    let folders = enumerate_folders_with(&parallel_dst, "", &root, EnumerateOptions { concurrency: 3 })
        .await
        .unwrap();
    assert_eq!(folders.len(), keys.len());
}
