//! Cache entry definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification outcome for a single object.
///
/// Every object seen during a scan falls into exactly one of these
/// categories. The serialized names are stable and must not change, since
/// they live in persisted cache files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Content decoded as valid UTF-8.
    Text,
    /// Content failed UTF-8 decoding.
    Binary,
    /// Empty object whose key marks a folder placeholder.
    Folder,
    /// The object exists but retrieval was denied.
    AccessDenied,
    /// Listed with a storage class other than STANDARD; never fetched.
    #[serde(rename = "non-standard-storage-class")]
    NonStandardStorage,
    /// Retrieval failed for a reason other than access denial.
    ContentGetError,
    /// Content was retrieved but could not be assessed.
    ContentAssessError,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Folder => "folder",
            Self::AccessDenied => "access-denied",
            Self::NonStandardStorage => "non-standard-storage-class",
            Self::ContentGetError => "content-get-error",
            Self::ContentAssessError => "content-assess-error",
        };
        f.write_str(name)
    }
}

/// Last known classification for one object key.
///
/// Entries are overwritten whole whenever a key is reprocessed; fields are
/// never merged across scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// ETag reported by the listing when this entry was written.
    pub etag: String,
    /// Classification at the time of the last fetch.
    pub category: Category,
    /// Whether the decoded text contained the search substring.
    ///
    /// Always `false` for non-`Text` categories.
    pub matched: bool,
}

impl CacheEntry {
    /// Create an entry for a freshly classified object.
    #[must_use]
    pub fn new(etag: impl Into<String>, category: Category, matched: bool) -> Self {
        Self {
            etag: etag.into(),
            category,
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialized_names_are_stable() {
        let cases = [
            (Category::Text, "\"text\""),
            (Category::Binary, "\"binary\""),
            (Category::Folder, "\"folder\""),
            (Category::AccessDenied, "\"access-denied\""),
            (
                Category::NonStandardStorage,
                "\"non-standard-storage-class\"",
            ),
            (Category::ContentGetError, "\"content-get-error\""),
            (Category::ContentAssessError, "\"content-assess-error\""),
        ];
        for (category, expected) in cases {
            assert_eq!(serde_json::to_string(&category).unwrap(), expected);
            let back: Category = serde_json::from_str(expected).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn test_display_matches_serialized_name() {
        let json = serde_json::to_string(&Category::NonStandardStorage).unwrap();
        assert_eq!(
            json.trim_matches('"'),
            Category::NonStandardStorage.to_string()
        );
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = CacheEntry::new("abc123", Category::Text, true);
        let json = serde_json::to_string(&entry).unwrap();
        let back: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
