//! Remote object storage boundary.
//!
//! The scan core talks to object storage through the [`ObjectStore`] trait:
//! a credential check, paginated listing, and whole-object retrieval. The
//! production implementation is [`s3::S3Store`]; [`mock::MockStore`] backs
//! the tests.
//!
//! Retrieval failures are split into exactly two classes at this boundary,
//! because the rest of the scan treats them differently: access denial is
//! its own classification category, everything else is a content-get error.

pub mod mock;
pub mod s3;

use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockStore;
pub use s3::S3Store;

/// One object as reported by a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedObject {
    /// Object key, unique within the bucket.
    pub key: String,
    /// Content fingerprint (ETag) from the listing.
    pub etag: String,
    /// Storage class, if the listing reported one.
    pub storage_class: Option<String>,
}

impl ListedObject {
    /// Create a standard-tier object description.
    #[must_use]
    pub fn new(key: impl Into<String>, etag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            etag: etag.into(),
            storage_class: None,
        }
    }

    /// Whether this object is in the standard storage tier.
    ///
    /// An absent storage class counts as standard; anything other than
    /// `STANDARD` (archival, infrequent access, ...) is excluded from
    /// content inspection.
    #[must_use]
    pub fn is_standard_tier(&self) -> bool {
        matches!(self.storage_class.as_deref(), None | Some("STANDARD"))
    }
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    /// Objects on this page, in listing order.
    pub objects: Vec<ListedObject>,
    /// Continuation token for the next page, if any.
    pub next: Option<String>,
}

/// Per-object retrieval failure, already split into the two classes the
/// scan distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The store refused to hand over the object.
    #[error("access denied")]
    AccessDenied,
    /// Any other retrieval failure (network, throttling, unknown).
    #[error("{0}")]
    Other(String),
}

/// Listing-level failure. Aborts the remaining pagination; per-object work
/// already done is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// Listing the bucket was denied.
    #[error("Access denied for bucket: {0}")]
    AccessDenied(String),
    /// The bucket does not exist.
    #[error("The specified bucket does not exist: {0}")]
    NotFound(String),
    /// Any other listing failure.
    #[error("Failed to list objects: {0}")]
    Other(String),
}

/// Interface the scan core needs from object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether an authenticated identity can be established with the store.
    async fn is_authenticated(&self) -> bool;

    /// Fetch one page of the bucket listing.
    ///
    /// Pass the previous page's continuation token to advance; `None`
    /// starts from the beginning. The listing is exhausted when the
    /// returned page carries no token.
    async fn list_page(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ListError>;

    /// Retrieve an object's full content.
    ///
    /// Empty bodies are valid. There is no size cap; the whole object is
    /// buffered.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_storage_class_is_standard_tier() {
        assert!(ListedObject::new("a.txt", "etag").is_standard_tier());
    }

    #[test]
    fn test_explicit_standard_class_is_standard_tier() {
        let mut object = ListedObject::new("a.txt", "etag");
        object.storage_class = Some("STANDARD".to_string());
        assert!(object.is_standard_tier());
    }

    #[test]
    fn test_archival_classes_are_not_standard_tier() {
        for class in ["GLACIER", "DEEP_ARCHIVE", "STANDARD_IA", "INTELLIGENT_TIERING"] {
            let mut object = ListedObject::new("a.txt", "etag");
            object.storage_class = Some(class.to_string());
            assert!(!object.is_standard_tier(), "{class} should not be standard");
        }
    }
}
