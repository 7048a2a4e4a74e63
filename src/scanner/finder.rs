//! Scan orchestration.
//!
//! [`Finder`] drives the whole scan: credential gate, cache lifecycle,
//! pagination, storage-tier partitioning, batching, and per-batch cache
//! persistence. Per-object failures never reach this level; listing-level
//! failures abort the remaining pagination but keep everything accumulated
//! so far.

use crate::cache::{Cache, CacheStore};
use crate::progress::ScanProgress;
use crate::remote::ObjectStore;
use crate::scanner::batch::reconcile_batch;
use crate::scanner::ScanReport;
use thiserror::Error;

/// Default number of objects per processing batch.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Fatal scan failures. Everything here means nothing was scanned; partial
/// failures mid-scan are reported through [`ScanReport::listing_error`]
/// instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The bucket name argument was empty.
    #[error("Bucket name is not set")]
    EmptyBucketName,

    /// No authenticated identity could be established.
    #[error("AWS credentials are not set or are invalid")]
    Credentials,

    /// The persisted cache could not be loaded.
    #[error(transparent)]
    Cache(#[from] anyhow::Error),
}

/// Scan orchestrator.
pub struct Finder<'a> {
    store: &'a dyn ObjectStore,
    cache_store: &'a CacheStore,
    progress: &'a dyn ScanProgress,
    batch_size: usize,
}

impl<'a> Finder<'a> {
    /// Create a finder with the default batch size.
    #[must_use]
    pub fn new(
        store: &'a dyn ObjectStore,
        cache_store: &'a CacheStore,
        progress: &'a dyn ScanProgress,
    ) -> Self {
        Self {
            store,
            cache_store,
            progress,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size (clamped to at least one).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Scan the bucket for text objects containing `substring`.
    ///
    /// Batches are reconciled sequentially and the cache is persisted after
    /// every batch, so an interrupted scan loses at most the in-flight
    /// batch. A listing failure mid-scan returns the partial report with
    /// [`ScanReport::listing_error`] set.
    pub async fn scan(&self, bucket: &str, substring: &str) -> Result<ScanReport, ScanError> {
        if bucket.is_empty() {
            return Err(ScanError::EmptyBucketName);
        }
        if !self.store.is_authenticated().await {
            return Err(ScanError::Credentials);
        }

        let mut cache = self.cache_store.load()?;
        if cache.search_substring != substring {
            // Matches are substring-specific; a cache built for a different
            // substring is worthless as a whole.
            if !cache.entries.is_empty() {
                log::info!(
                    "Search substring changed ({:?} -> {:?}); discarding {} cached entries",
                    cache.search_substring,
                    substring,
                    cache.entries.len()
                );
            }
            cache = Cache::new(substring);
        }

        let mut report = ScanReport::default();
        let mut continuation: Option<String> = None;
        let mut batch_number = 0usize;

        'pages: loop {
            let page = match self.store.list_page(bucket, continuation.take()).await {
                Ok(page) => page,
                Err(err) => {
                    log::error!("{err}");
                    report.listing_error = Some(err.to_string());
                    break;
                }
            };

            let (standard, non_standard): (Vec<_>, Vec<_>) = page
                .objects
                .into_iter()
                .partition(|object| object.is_standard_tier());
            report.total_objects += (standard.len() + non_standard.len()) as u64;

            // Non-standard tiers are excluded from content inspection:
            // counted straight into the totals, never fetched, never cached.
            for object in non_standard {
                report.tally.non_standard_storage.fresh += 1;
                report.lists.non_standard_storage.push(object.key);
            }

            for batch in standard.chunks(self.batch_size) {
                batch_number += 1;
                let result = reconcile_batch(
                    self.store,
                    bucket,
                    batch,
                    &mut cache,
                    substring,
                    batch_number,
                    self.progress,
                )
                .await;
                report.absorb(result);

                if let Err(err) = self.cache_store.save(&cache) {
                    log::error!("Failed to persist cache: {err:#}");
                    report.listing_error = Some(format!("cache persistence failed: {err}"));
                    break 'pages;
                }
            }

            match page.next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        Ok(report)
    }
}
