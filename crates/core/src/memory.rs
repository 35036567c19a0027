//! In-memory bucket for tests
//!
//! Behaves like an S3 bucket listed with delimiter `/`: every key under a
//! prefix contributes its first path segment as a child prefix, whether or not
//! a marker object exists for it.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{FolderStore, PrefixPage};

#[derive(Debug, Default)]
struct State {
    keys: BTreeSet<String>,
    writes: Vec<String>,
    list_calls: usize,
    failing: HashSet<String>,
}

/// A bucket held in memory
#[derive(Debug)]
pub struct MemoryBucket {
    name: String,
    page_size: usize,
    state: Mutex<State>,
}

impl MemoryBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_size: 1000,
            state: Mutex::new(State::default()),
        }
    }

    /// Bucket pre-populated with `keys` (folders or files)
    pub fn with_keys<I, S>(name: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bucket = Self::new(name);
        bucket
            .lock()
            .keys
            .extend(keys.into_iter().map(Into::into));
        bucket
    }

    /// Limit how many child prefixes a single listing page returns
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make `create_empty_object` fail for `key`
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        self.lock().failing.insert(key.into());
    }

    /// All keys currently in the bucket
    pub fn keys(&self) -> BTreeSet<String> {
        self.lock().keys.clone()
    }

    /// Keys written through `create_empty_object`, in call order
    pub fn writes(&self) -> Vec<String> {
        self.lock().writes.clone()
    }

    /// Number of listing pages served
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FolderStore for MemoryBucket {
    async fn list_child_prefixes(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<PrefixPage> {
        let mut state = self.lock();
        state.list_calls += 1;

        let start = match continuation_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| Error::Network(format!("invalid continuation token: {token}")))?,
            None => 0,
        };

        let under_prefix: Vec<&String> = state
            .keys
            .iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        let has_objects = !under_prefix.is_empty();

        let children: BTreeSet<String> = under_prefix
            .iter()
            .filter_map(|key| {
                let rest = &key[prefix.len()..];
                rest.find('/')
                    .map(|idx| format!("{prefix}{}", &rest[..=idx]))
            })
            .collect();

        let page: Vec<String> = children
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let next = start + page.len();
        let continuation_token = (next < children.len()).then(|| next.to_string());

        Ok(PrefixPage {
            prefixes: page,
            has_objects,
            continuation_token,
        })
    }

    async fn create_empty_object(&self, key: &str) -> Result<()> {
        let mut state = self.lock();

        if state.failing.contains(key) {
            return Err(Error::Network(format!(
                "simulated write failure for {}/{key}",
                self.name
            )));
        }

        state.keys.insert(key.to_string());
        state.writes.push(key.to_string());
        Ok(())
    }
}
