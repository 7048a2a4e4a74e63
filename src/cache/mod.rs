//! Classification cache for s3grep.
//!
//! This module provides persistent storage for per-object classifications so
//! repeated scans avoid re-fetching unchanged objects.
//!
//! # Architecture
//!
//! * [`store`]: JSON persistence with a checksum envelope and schema version.
//! * [`entry`]: The data model stored in the cache.
//!
//! # Cache Invalidation
//!
//! An entry is valid only while the object's listed ETag matches the one
//! recorded at classification time; any difference forces a re-fetch. The
//! whole cache is additionally keyed by the search substring: matches are
//! substring-specific, so a scan for a different substring discards every
//! entry before it starts.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, Category};
pub use store::{Cache, CacheStore, CACHE_VERSION};
