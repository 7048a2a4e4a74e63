//! Cache persistence behavior across scans.

use s3grep::cache::{Cache, CacheEntry, CacheStore, Category, CACHE_VERSION};
use tempfile::TempDir;

fn populated_cache() -> Cache {
    let mut cache = Cache::new("needle");
    cache.entries.insert(
        "report.txt".to_string(),
        CacheEntry::new("etag-1", Category::Text, true),
    );
    cache.entries.insert(
        "image.png".to_string(),
        CacheEntry::new("etag-2", Category::Binary, false),
    );
    cache.entries.insert(
        "archive/".to_string(),
        CacheEntry::new("etag-3", Category::Folder, false),
    );
    cache
}

#[test]
fn test_persisted_file_has_envelope_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    CacheStore::new(&path).save(&populated_cache()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["checksum"].is_string());
    assert_eq!(raw["cache"]["version"], CACHE_VERSION);
    assert_eq!(raw["cache"]["search_substring"], "needle");
    assert_eq!(
        raw["cache"]["entries"]["report.txt"]["category"],
        "text"
    );
    assert_eq!(raw["cache"]["entries"]["report.txt"]["matched"], true);
}

#[test]
fn test_round_trip_is_exact() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::new(dir.path().join("cache.json"));
    let cache = populated_cache();

    store.save(&cache).unwrap();
    assert_eq!(store.load().unwrap(), cache);
}

#[test]
fn test_save_overwrites_previous_contents() {
    let dir = TempDir::new().unwrap();
    let store = CacheStore::new(dir.path().join("cache.json"));

    store.save(&populated_cache()).unwrap();
    let replacement = Cache::new("different");
    store.save(&replacement).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.search_substring, "different");
    assert!(loaded.entries.is_empty());
}

#[test]
fn test_error_categories_round_trip() {
    // Entries carrying failure categories persist like any other; a rerun
    // with unchanged ETags reuses them without re-fetching.
    let dir = TempDir::new().unwrap();
    let store = CacheStore::new(dir.path().join("cache.json"));
    let mut cache = Cache::new("needle");
    cache.entries.insert(
        "denied.txt".to_string(),
        CacheEntry::new("etag-1", Category::AccessDenied, false),
    );
    cache.entries.insert(
        "flaky.txt".to_string(),
        CacheEntry::new("etag-2", Category::ContentGetError, false),
    );
    cache.entries.insert(
        "odd.txt".to_string(),
        CacheEntry::new("etag-3", Category::ContentAssessError, false),
    );

    store.save(&cache).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded.entries["denied.txt"].category, Category::AccessDenied);
    assert_eq!(
        loaded.entries["flaky.txt"].category,
        Category::ContentGetError
    );
    assert_eq!(
        loaded.entries["odd.txt"].category,
        Category::ContentAssessError
    );
}

#[test]
fn test_truncated_file_fails_closed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    let store = CacheStore::new(&path);
    store.save(&populated_cache()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, &content[..content.len() / 2]).unwrap();

    assert!(store.load().is_err());
}
