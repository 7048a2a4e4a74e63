//! Persistent classification cache.
//!
//! The cache is a JSON file wrapped in an integrity envelope: the serialized
//! cache plus a SHA-256 checksum of its compact form. Loading verifies the
//! checksum and a numeric schema version so that format drift or tampering
//! fails closed with a clear diagnostic instead of feeding garbage into a
//! scan.

use crate::cache::entry::CacheEntry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Current schema version of the persisted cache.
pub const CACHE_VERSION: u32 = 1;

/// Per-bucket classification cache.
///
/// Entries are only meaningful for the substring they were built for; a
/// scan with a different substring discards them wholesale before starting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    /// Schema version, checked on load.
    pub version: u32,
    /// The substring the entries were classified against.
    pub search_substring: String,
    /// Last known classification per object key.
    pub entries: HashMap<String, CacheEntry>,
}

impl Cache {
    /// Create an empty cache for the given search substring.
    #[must_use]
    pub fn new(substring: impl Into<String>) -> Self {
        Self {
            version: CACHE_VERSION,
            search_substring: substring.into(),
            entries: HashMap::new(),
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new("")
    }
}

/// Envelope for cache files to include integrity checks.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    /// SHA-256 checksum of the compact-serialized cache.
    checksum: String,
    /// The actual cache data.
    cache: Cache,
}

fn checksum_of(cache: &Cache) -> Result<String> {
    let compact =
        serde_json::to_string(cache).context("Failed to serialize cache for checksum calculation")?;
    let mut hasher = Sha256::new();
    hasher.update(compact.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Handle to the cache file on disk.
///
/// A disabled store (from `--no-cache`) loads an empty cache and makes
/// every save a no-op, so callers never branch on caching being active.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: Option<PathBuf>,
}

impl CacheStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Create a store that never reads or writes disk.
    #[must_use]
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Default cache file location for a bucket (working directory).
    #[must_use]
    pub fn default_path(bucket: &str) -> PathBuf {
        PathBuf::from(format!("s3grep-cache-{bucket}.json"))
    }

    /// Path this store persists to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the cache from disk.
    ///
    /// A missing file yields an empty cache. A file that exists but does
    /// not conform to the expected envelope, fails the checksum, or carries
    /// an unsupported version is a hard error: malformed persisted state is
    /// never silently repaired, the operator has to delete the file.
    pub fn load(&self) -> Result<Cache> {
        let Some(path) = &self.path else {
            return Ok(Cache::default());
        };
        if !path.exists() {
            log::debug!("No cache file at {}, starting empty", path.display());
            return Ok(Cache::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
        let envelope: CacheEnvelope = serde_json::from_str(&content).with_context(|| {
            format!(
                "Cache file structure is invalid: {}. Delete the cache file and re-run.",
                path.display()
            )
        })?;

        let calculated = checksum_of(&envelope.cache)?;
        if calculated != envelope.checksum {
            anyhow::bail!(
                "Cache integrity check failed for {}: checksum mismatch. Delete the cache file and re-run.",
                path.display()
            );
        }
        if envelope.cache.version != CACHE_VERSION {
            anyhow::bail!(
                "Unsupported cache version {} in {} (current version is {}). Delete the cache file and re-run.",
                envelope.cache.version,
                path.display(),
                CACHE_VERSION
            );
        }

        log::debug!(
            "Loaded {} cached entries from {}",
            envelope.cache.entries.len(),
            path.display()
        );
        Ok(envelope.cache)
    }

    /// Persist the cache to disk, replacing any previous contents.
    pub fn save(&self, cache: &Cache) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let envelope = CacheEnvelope {
            checksum: checksum_of(cache)?,
            cache: cache.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope)
            .context("Failed to serialize cache envelope")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;
        Ok(())
    }
}
