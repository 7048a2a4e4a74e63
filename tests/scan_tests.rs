//! End-to-end scan scenarios against the in-memory object store.

use s3grep::cache::{Cache, CacheStore, Category};
use s3grep::progress::NoProgress;
use s3grep::remote::MockStore;
use s3grep::scanner::{Finder, ScanReport};
use tempfile::TempDir;

const BUCKET: &str = "test-bucket";

/// A bucket with one matching text object, one non-matching text object,
/// one binary object, and one folder marker.
fn seeded_store() -> MockStore {
    let store = MockStore::new();
    store.insert("a.txt", "etag-a1", b"hello world");
    store.insert("b.bin", "etag-b1", &[0xff, 0xfe, 0x00, 0x80]);
    store.insert("logs/", "etag-l1", b"");
    store.insert("c.txt", "etag-c1", b"goodbye");
    store
}

fn cache_store(dir: &TempDir) -> CacheStore {
    CacheStore::new(dir.path().join("cache.json"))
}

async fn scan(store: &MockStore, cache_store: &CacheStore, substring: &str) -> ScanReport {
    Finder::new(store, cache_store, &NoProgress)
        .scan(BUCKET, substring)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_first_scan_classifies_everything() {
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = scan(&store, &cache, "hello").await;

    assert_eq!(report.total_objects, 4);
    assert_eq!(report.matched_keys(), ["a.txt"]);
    assert_eq!(report.tally.text.fresh, 2);
    assert_eq!(report.tally.binary.fresh, 1);
    assert_eq!(report.tally.folder.fresh, 1);
    assert_eq!(report.tally.matched_text.fresh, 1);
    assert_eq!(report.lists.folder, ["logs/"]);
    assert!(report.changed_keys.is_empty());
    assert!(report.listing_error.is_none());
    assert_eq!(store.fetch_calls(), 4);

    let persisted = cache.load().unwrap();
    assert_eq!(persisted.search_substring, "hello");
    assert_eq!(persisted.entries["a.txt"].category, Category::Text);
    assert!(persisted.entries["a.txt"].matched);
    assert_eq!(persisted.entries["b.bin"].category, Category::Binary);
    assert_eq!(persisted.entries["logs/"].category, Category::Folder);
    assert_eq!(persisted.entries["c.txt"].category, Category::Text);
    assert!(!persisted.entries["c.txt"].matched);
}

#[tokio::test]
async fn test_rerun_resolves_entirely_from_cache() {
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let first = scan(&store, &cache, "hello").await;
    store.reset_counters();
    let second = scan(&store, &cache, "hello").await;

    assert_eq!(store.fetch_calls(), 0);
    assert_eq!(second.matched_keys(), first.matched_keys());
    assert_eq!(second.tally.text.cached, 2);
    assert_eq!(second.tally.binary.cached, 1);
    assert_eq!(second.tally.folder.cached, 1);
    assert_eq!(second.tally.matched_text.cached, 1);
    // Nothing was classified fresh the second time around.
    assert_eq!(second.tally.text.fresh, 0);
    assert_eq!(second.tally.binary.fresh, 0);
    assert_eq!(second.tally.folder.fresh, 0);
}

#[tokio::test]
async fn test_changed_etag_is_refetched_and_joins_matches() {
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    scan(&store, &cache, "hello").await;
    store.insert("c.txt", "etag-c2", b"hello there");
    store.reset_counters();

    let report = scan(&store, &cache, "hello").await;

    assert_eq!(report.changed_keys, ["c.txt"]);
    // Only the modified object was fetched.
    assert_eq!(store.fetch_calls(), 1);
    let mut matched = report.matched_keys().to_vec();
    matched.sort();
    assert_eq!(matched, ["a.txt", "c.txt"]);

    let persisted = cache.load().unwrap();
    assert_eq!(persisted.entries["c.txt"].etag, "etag-c2");
    assert!(persisted.entries["c.txt"].matched);
}

#[tokio::test]
async fn test_substring_change_invalidates_whole_cache() {
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    scan(&store, &cache, "hello").await;
    store.reset_counters();

    let report = scan(&store, &cache, "goodbye").await;

    // Zero cache hits: every standard object was re-fetched.
    assert_eq!(store.fetch_calls(), 4);
    assert_eq!(report.tally.text.cached, 0);
    assert_eq!(report.tally.binary.cached, 0);
    assert_eq!(report.tally.folder.cached, 0);
    assert_eq!(report.matched_keys(), ["c.txt"]);

    let persisted = cache.load().unwrap();
    assert_eq!(persisted.search_substring, "goodbye");
}

#[tokio::test]
async fn test_category_sums_cover_every_standard_object() {
    let store = seeded_store();
    store.insert_denied("secret.txt", "etag-s1");
    store.insert_failing("flaky.txt", "etag-f1", "throttled");
    store.insert_tiered("archive.dat", "etag-g1", "GLACIER");
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = scan(&store, &cache, "hello").await;

    assert_eq!(report.total_objects, 7);
    // Six standard-tier objects, one non-standard.
    let standard_total = report.tally.text.total()
        + report.tally.binary.total()
        + report.tally.folder.total()
        + report.tally.access_denied.total()
        + report.tally.content_get_error.total()
        + report.tally.content_assess_error.total();
    assert_eq!(standard_total, 6);
    assert_eq!(report.tally.non_standard_storage.total(), 1);
    assert_eq!(report.tally.classified_total(), report.total_objects);
    assert_eq!(report.lists.non_standard_storage, ["archive.dat"]);
    assert_eq!(report.lists.access_denied, ["secret.txt"]);
    assert_eq!(report.lists.content_get_error, ["flaky.txt"]);
}

#[tokio::test]
async fn test_non_standard_tier_is_never_fetched_or_cached() {
    let store = MockStore::new();
    store.insert_tiered("archive.dat", "etag-1", "DEEP_ARCHIVE");
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = scan(&store, &cache, "hello").await;

    assert_eq!(store.fetch_calls(), 0);
    assert_eq!(report.tally.non_standard_storage.fresh, 1);
    assert!(cache.load().unwrap().entries.is_empty());
}

#[tokio::test]
async fn test_non_standard_tier_ignores_prior_cache_entries() {
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    scan(&store, &cache, "hello").await;
    // a.txt moves to an archival tier between scans.
    store.insert_tiered("a.txt", "etag-a1", "GLACIER");
    store.reset_counters();

    let report = scan(&store, &cache, "hello").await;

    // Counted as a fresh non-standard object even though a cache entry
    // exists for the key; it is never checked against the cache.
    assert_eq!(report.tally.non_standard_storage.fresh, 1);
    assert_eq!(report.tally.non_standard_storage.cached, 0);
    assert_eq!(report.lists.non_standard_storage, ["a.txt"]);
    assert!(report.matched_keys().is_empty());
}

#[tokio::test]
async fn test_access_denied_object_does_not_stop_the_scan() {
    let store = seeded_store();
    store.insert_denied("aa-secret.txt", "etag-s1");
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = scan(&store, &cache, "hello").await;

    // The denied object sorts first in the listing; everything after it
    // was still processed.
    assert_eq!(report.tally.access_denied.fresh, 1);
    assert_eq!(report.lists.access_denied, ["aa-secret.txt"]);
    assert_eq!(report.matched_keys(), ["a.txt"]);
    assert_eq!(report.total_objects, 5);
    assert!(report.listing_error.is_none());
}

#[tokio::test]
async fn test_listing_failure_returns_partial_results() {
    let store = seeded_store().with_page_size(2);
    store.fail_listing_after(1);
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = scan(&store, &cache, "hello").await;

    assert!(report.listing_error.is_some());
    // Only the first page (a.txt, b.bin) was processed.
    assert_eq!(report.total_objects, 2);
    assert_eq!(report.matched_keys(), ["a.txt"]);
    // The first page's classifications were persisted before the failure.
    let persisted = cache.load().unwrap();
    assert_eq!(persisted.entries.len(), 2);
    assert!(persisted.entries.contains_key("a.txt"));
}

#[tokio::test]
async fn test_cache_persisted_between_batches() {
    let store = seeded_store().with_page_size(1);
    store.fail_listing_after(2);
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = scan(&store, &cache, "hello").await;

    // Two single-object pages completed before the listing failed; their
    // work survived even though the scan did not finish.
    assert_eq!(report.total_objects, 2);
    assert_eq!(cache.load().unwrap().entries.len(), 2);
}

#[tokio::test]
async fn test_small_batches_produce_the_same_totals() {
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = Finder::new(&store, &cache, &NoProgress)
        .with_batch_size(1)
        .scan(BUCKET, "hello")
        .await
        .unwrap();

    assert_eq!(report.total_objects, 4);
    assert_eq!(report.matched_keys(), ["a.txt"]);
    assert_eq!(report.tally.classified_total(), 4);
}

#[tokio::test]
async fn test_disabled_cache_still_scans() {
    let store = seeded_store();
    let cache = CacheStore::disabled();

    let report = scan(&store, &cache, "hello").await;
    assert_eq!(report.matched_keys(), ["a.txt"]);

    // Without persistence every rerun re-fetches everything.
    store.reset_counters();
    scan(&store, &cache, "hello").await;
    assert_eq!(store.fetch_calls(), 4);
}

#[tokio::test]
async fn test_malformed_cache_is_fatal() {
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(&path, "not json at all").unwrap();
    let cache = CacheStore::new(&path);

    let result = Finder::new(&store, &cache, &NoProgress)
        .scan(BUCKET, "hello")
        .await;

    assert!(result.is_err());
    // Nothing was fetched: the scan stopped before touching the bucket
    // contents.
    assert_eq!(store.fetch_calls(), 0);
}

#[tokio::test]
async fn test_empty_bucket_produces_empty_report() {
    let store = MockStore::new();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    let report = scan(&store, &cache, "hello").await;

    assert_eq!(report.total_objects, 0);
    assert!(report.matched_keys().is_empty());
    assert!(report.listing_error.is_none());
}

#[tokio::test]
async fn test_cache_entries_survive_for_later_scans() {
    // Direct check of the round-trip the reruns rely on.
    let store = seeded_store();
    let dir = TempDir::new().unwrap();
    let cache = cache_store(&dir);

    scan(&store, &cache, "hello").await;
    let persisted: Cache = cache.load().unwrap();
    cache.save(&persisted).unwrap();
    assert_eq!(cache.load().unwrap(), persisted);
}
