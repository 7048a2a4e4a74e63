//! Bucket scanning engine.
//!
//! This module contains the two halves of the scan core:
//! - [`batch`]: reconciles one batch of listed objects against the cache,
//!   fetching and classifying only what changed.
//! - [`finder`]: drives pagination, storage-tier partitioning, batching,
//!   and per-batch cache persistence.
//!
//! The terminal output of a scan is a [`ScanReport`]: scan-wide category
//! totals (split by cache hit/miss), the per-category key lists, and the
//! keys whose ETag changed since the last scan.

pub mod batch;
pub mod finder;

pub use batch::{BatchResult, CategoryTally, Counter, FileLists};
pub use finder::{Finder, ScanError, DEFAULT_BATCH_SIZE};

use serde::Serialize;

/// Scan-wide totals and key lists. Produced once per scan; not persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Every object seen in the listing, standard tier or not.
    pub total_objects: u64,
    /// Category counters, split cached/fresh.
    pub tally: CategoryTally,
    /// Per-category key lists.
    pub lists: FileLists,
    /// Keys whose ETag changed since the previous cache write.
    pub changed_keys: Vec<String>,
    /// Set when pagination aborted early; the report then holds partial
    /// totals rather than the whole bucket.
    pub listing_error: Option<String>,
}

impl ScanReport {
    /// Fold one batch's results into the running totals.
    pub fn absorb(&mut self, batch: BatchResult) {
        self.tally.merge(&batch.tally);
        self.lists.merge(batch.lists);
        self.changed_keys.extend(batch.changed_keys);
    }

    /// Keys of text objects that contained the substring, in listing order.
    #[must_use]
    pub fn matched_keys(&self) -> &[String] {
        &self.lists.matched
    }

    /// Whether any per-object retrieval or assessment errors occurred.
    /// Access denial is its own category, not an error.
    #[must_use]
    pub fn had_object_errors(&self) -> bool {
        self.tally.content_get_error.total() > 0 || self.tally.content_assess_error.total() > 0
    }

    /// Print the operator-facing summary to stdout.
    ///
    /// With `debug`, also prints every key in the access-denied,
    /// non-standard-storage, folder, and error categories.
    pub fn print_summary(&self, substring: &str, debug: bool) {
        if self.total_objects == 0 {
            log::info!("No objects listed in the bucket.");
            return;
        }

        println!("\n========== Summary ==========");
        if let Some(cause) = &self.listing_error {
            println!("Listing aborted early, totals are partial: {cause}");
        }
        println!("Total objects in the bucket: {}", self.total_objects);
        for (label, counter) in self.tally.rows() {
            println!(
                "Total {}: {} (Cache: {}, Non-cache: {})",
                lowercase_first(label),
                counter.total(),
                counter.cached,
                counter.fresh
            );
        }
        if !self.changed_keys.is_empty() {
            println!("Changed objects since last scan: {}", self.changed_keys.len());
        }

        if debug {
            print_key_list("Access denied paths", &self.lists.access_denied);
            print_key_list(
                "Non-standard storage class objects",
                &self.lists.non_standard_storage,
            );
            print_key_list("Folder objects", &self.lists.folder);
            print_key_list("Content get error objects", &self.lists.content_get_error);
            print_key_list(
                "Content assess error objects",
                &self.lists.content_assess_error,
            );
            print_key_list("Changed keys", &self.changed_keys);
        }

        if self.lists.matched.is_empty() {
            println!("\nNo objects identified with the specified string.");
        } else {
            println!("\nObject keys containing the substring '{substring}':");
            for key in &self.lists.matched {
                println!("{key}");
            }
        }
        println!("========== End of Summary ==========");
    }
}

fn print_key_list(label: &str, keys: &[String]) {
    if keys.is_empty() {
        return;
    }
    println!("\n{label}:");
    for key in keys {
        println!("{key}");
    }
}

fn lowercase_first(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
