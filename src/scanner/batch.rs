//! Per-batch reconciliation of listed objects against the cache.
//!
//! For each object in a batch: a cache entry with a matching ETag is reused
//! as-is; anything else is fetched, classified, and written back to the
//! cache. The batch produces an immutable [`BatchResult`] that the
//! orchestrator folds into the scan-wide totals, so merging stays an
//! explicit, associative reduction.

use crate::cache::{Cache, CacheEntry, Category};
use crate::classify::classify;
use crate::progress::{quarter_checkpoints, ScanProgress};
use crate::remote::{FetchError, ListedObject, ObjectStore};
use serde::Serialize;

/// One counter split into its cache-hit and cache-miss sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counter {
    /// Objects resolved from the cache.
    pub cached: u64,
    /// Objects that were fetched and classified this scan.
    pub fresh: u64,
}

impl Counter {
    /// Sum of both sides.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cached + self.fresh
    }

    fn bump(&mut self, cached: bool) {
        if cached {
            self.cached += 1;
        } else {
            self.fresh += 1;
        }
    }

    fn merge(&mut self, other: Self) {
        self.cached += other.cached;
        self.fresh += other.fresh;
    }
}

/// The sixteen scan counters: eight categories, each split cached/fresh.
///
/// `matched_text` counts the subset of `text` objects containing the
/// substring, so it is not part of the per-object category partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    pub text: Counter,
    pub matched_text: Counter,
    pub binary: Counter,
    pub folder: Counter,
    pub access_denied: Counter,
    pub non_standard_storage: Counter,
    pub content_get_error: Counter,
    pub content_assess_error: Counter,
}

impl CategoryTally {
    /// Bump the counter for an object's category.
    pub fn bump(&mut self, category: Category, cached: bool) {
        match category {
            Category::Text => self.text.bump(cached),
            Category::Binary => self.binary.bump(cached),
            Category::Folder => self.folder.bump(cached),
            Category::AccessDenied => self.access_denied.bump(cached),
            Category::NonStandardStorage => self.non_standard_storage.bump(cached),
            Category::ContentGetError => self.content_get_error.bump(cached),
            Category::ContentAssessError => self.content_assess_error.bump(cached),
        }
    }

    /// Fold another tally into this one. Associative and commutative.
    pub fn merge(&mut self, other: &Self) {
        self.text.merge(other.text);
        self.matched_text.merge(other.matched_text);
        self.binary.merge(other.binary);
        self.folder.merge(other.folder);
        self.access_denied.merge(other.access_denied);
        self.non_standard_storage.merge(other.non_standard_storage);
        self.content_get_error.merge(other.content_get_error);
        self.content_assess_error.merge(other.content_assess_error);
    }

    /// Number of objects accounted for by the seven category counters.
    #[must_use]
    pub fn classified_total(&self) -> u64 {
        self.text.total()
            + self.binary.total()
            + self.folder.total()
            + self.access_denied.total()
            + self.non_standard_storage.total()
            + self.content_get_error.total()
            + self.content_assess_error.total()
    }

    /// Summary rows in reporting order: label plus counter.
    #[must_use]
    pub fn rows(&self) -> [(&'static str, Counter); 8] {
        [
            ("Text objects", self.text),
            ("Binary objects", self.binary),
            ("Access denied paths", self.access_denied),
            (
                "Non-standard storage class objects",
                self.non_standard_storage,
            ),
            ("Folder objects", self.folder),
            ("Content get errors", self.content_get_error),
            ("Content assess errors", self.content_assess_error),
            ("Matched text objects", self.matched_text),
        ]
    }
}

/// Object-key lists collected for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileLists {
    /// Text objects containing the substring.
    pub matched: Vec<String>,
    pub access_denied: Vec<String>,
    pub non_standard_storage: Vec<String>,
    pub folder: Vec<String>,
    pub content_get_error: Vec<String>,
    pub content_assess_error: Vec<String>,
}

impl FileLists {
    /// Append another set of lists. Concatenation keeps listing order.
    pub fn merge(&mut self, other: Self) {
        self.matched.extend(other.matched);
        self.access_denied.extend(other.access_denied);
        self.non_standard_storage.extend(other.non_standard_storage);
        self.folder.extend(other.folder);
        self.content_get_error.extend(other.content_get_error);
        self.content_assess_error.extend(other.content_assess_error);
    }
}

/// Aggregate produced by reconciling one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub tally: CategoryTally,
    pub lists: FileLists,
    /// Keys whose ETag differed from the cached one (modified objects).
    pub changed_keys: Vec<String>,
}

impl BatchResult {
    /// Account for a cache hit: reuse the stored classification.
    fn record_hit(&mut self, key: &str, entry: &CacheEntry) {
        self.tally.bump(entry.category, true);
        match entry.category {
            Category::Text => {
                if entry.matched {
                    self.tally.matched_text.bump(true);
                    self.lists.matched.push(key.to_string());
                }
            }
            Category::AccessDenied => self.lists.access_denied.push(key.to_string()),
            Category::NonStandardStorage => {
                self.lists.non_standard_storage.push(key.to_string());
            }
            Category::Folder => self.lists.folder.push(key.to_string()),
            // Get/assess errors are counted on hits but only listed when
            // they occur fresh.
            Category::Binary | Category::ContentGetError | Category::ContentAssessError => {}
        }
    }

    /// Account for a freshly classified object.
    fn record_fresh(&mut self, key: &str, category: Category, matched: bool) {
        self.tally.bump(category, false);
        if matched {
            self.tally.matched_text.bump(false);
            self.lists.matched.push(key.to_string());
        }
        match category {
            Category::AccessDenied => self.lists.access_denied.push(key.to_string()),
            Category::NonStandardStorage => {
                self.lists.non_standard_storage.push(key.to_string());
            }
            Category::Folder => self.lists.folder.push(key.to_string()),
            Category::ContentGetError => self.lists.content_get_error.push(key.to_string()),
            Category::ContentAssessError => {
                self.lists.content_assess_error.push(key.to_string());
            }
            Category::Text | Category::Binary => {}
        }
    }
}

/// Reconcile one batch of listed objects against the cache.
///
/// Objects are processed sequentially in listing order. Cache entries are
/// overwritten in place for every miss; the caller is responsible for
/// persisting the cache afterwards. Per-object failures are converted into
/// categories and never abort the batch.
pub async fn reconcile_batch(
    store: &dyn ObjectStore,
    bucket: &str,
    batch: &[ListedObject],
    cache: &mut Cache,
    substring: &str,
    batch_number: usize,
    progress: &dyn ScanProgress,
) -> BatchResult {
    let mut result = BatchResult::default();
    let total = batch.len();
    let checkpoints = quarter_checkpoints(total);

    log::info!("========== Starting batch {batch_number} ==========");
    progress.on_batch_start(batch_number, total);

    for (index, object) in batch.iter().enumerate() {
        let hit = cache
            .entries
            .get(&object.key)
            .filter(|entry| entry.etag == object.etag)
            .cloned();

        if let Some(entry) = hit {
            result.record_hit(&object.key, &entry);
        } else {
            if cache.entries.contains_key(&object.key) {
                result.changed_keys.push(object.key.clone());
            }
            let (category, matched) = fetch_and_classify(store, bucket, &object.key, substring).await;
            cache.entries.insert(
                object.key.clone(),
                CacheEntry::new(object.etag.clone(), category, matched),
            );
            result.record_fresh(&object.key, category, matched);
        }

        let completed = index + 1;
        progress.on_object(completed, total);
        if checkpoints.contains(&completed) {
            let percent = (completed * 100 / total) as u8;
            progress.on_checkpoint(batch_number, percent);
        }
    }

    log_batch_summary(batch_number, &result);
    progress.on_batch_end(batch_number);
    result
}

/// Fetch one object and classify it, translating transport failures into
/// their classification categories.
async fn fetch_and_classify(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    substring: &str,
) -> (Category, bool) {
    match store.get_object(bucket, key).await {
        Ok(content) => {
            let classification = classify(key, &content, substring);
            (classification.category, classification.matched)
        }
        Err(FetchError::AccessDenied) => {
            log::debug!("Access denied for object: {key}");
            (Category::AccessDenied, false)
        }
        Err(FetchError::Other(message)) => {
            log::warn!("Failed to read object {key}: {message}");
            (Category::ContentGetError, false)
        }
    }
}

fn log_batch_summary(batch_number: usize, result: &BatchResult) {
    log::info!("Batch {batch_number} processed:");
    for (label, counter) in result.tally.rows() {
        log::info!(
            "- {}: {} (cache: {}, non-cache: {})",
            label,
            counter.total(),
            counter.cached,
            counter.fresh
        );
    }
    if !result.changed_keys.is_empty() {
        log::info!("- Changed keys: {:?}", result.changed_keys);
    }
    log::info!("========== Finished batch {batch_number} ==========");
}
