//! Object content classification.
//!
//! Given an object's key and raw bytes, decide whether it is a folder
//! placeholder, text, or binary, and for text whether it contains the
//! search substring. The UTF-8 decode happens exactly once; its result
//! drives both the text/binary decision and the substring test.

use crate::cache::Category;

/// Key suffix some tools write for empty folder-placeholder objects.
pub const FOLDER_MARKER_SUFFIX: &str = "$folder$";

/// Result of classifying one object's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Category the object falls into.
    pub category: Category,
    /// Whether the decoded text contained the substring (text only).
    pub matched: bool,
}

impl Classification {
    fn unmatched(category: Category) -> Self {
        Self {
            category,
            matched: false,
        }
    }
}

/// Classify an object's content.
///
/// The folder check runs first: an empty body whose key ends with a path
/// separator or the `$folder$` marker is a folder placeholder regardless of
/// anything else. Otherwise the content is decoded as UTF-8 once; success
/// means text (searched for `substring`, case-sensitive, no normalization),
/// failure means binary.
#[must_use]
pub fn classify(key: &str, content: &[u8], substring: &str) -> Classification {
    if content.is_empty() && (key.ends_with('/') || key.ends_with(FOLDER_MARKER_SUFFIX)) {
        return Classification::unmatched(Category::Folder);
    }

    match std::str::from_utf8(content) {
        Ok(text) => Classification {
            category: Category::Text,
            matched: text.contains(substring),
        },
        Err(_) => Classification::unmatched(Category::Binary),
    }
}
