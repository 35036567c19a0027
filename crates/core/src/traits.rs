//! Storage capability used by the enumerator and the sync engine
//!
//! This trait is the only thing the core needs from a storage backend, so the
//! S3 adapter and test fakes are interchangeable.

use async_trait::async_trait;

use crate::error::Result;

/// One page of a delimiter-grouped listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixPage {
    /// Immediate child prefixes (folders) of the requested prefix
    pub prefixes: Vec<String>,

    /// Whether the page reported any key or child prefix at all
    pub has_objects: bool,

    /// Token for the next page, `None` on the last page
    pub continuation_token: Option<String>,
}

impl PrefixPage {
    /// A final page holding `prefixes`
    pub fn last(prefixes: Vec<String>) -> Self {
        let has_objects = !prefixes.is_empty();
        Self {
            prefixes,
            has_objects,
            continuation_token: None,
        }
    }

    pub fn is_last(&self) -> bool {
        self.continuation_token.is_none()
    }
}

/// A handle to one bucket: credentials plus bucket identity.
///
/// Listing is read-only; `create_empty_object` is the only write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// List the immediate child prefixes of `prefix`, grouped by `/`.
    ///
    /// Pass the previous page's `continuation_token` to fetch the next page.
    async fn list_child_prefixes(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<PrefixPage>;

    /// Write a zero-length object at `key`
    async fn create_empty_object(&self, key: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_page_last() {
        let page = PrefixPage::last(vec!["a/".to_string()]);
        assert!(page.is_last());
        assert!(page.has_objects);

        let empty = PrefixPage::last(vec![]);
        assert!(!empty.has_objects);
    }
}
