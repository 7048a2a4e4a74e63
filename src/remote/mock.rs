//! In-memory object store for tests.

use crate::remote::{FetchError, ListError, ListedObject, ObjectPage, ObjectStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted outcome for retrieving one object.
#[derive(Debug, Clone)]
pub enum MockBody {
    /// Retrieval succeeds with these bytes.
    Bytes(Vec<u8>),
    /// Retrieval fails with a permission-denied outcome.
    AccessDenied,
    /// Retrieval fails with a generic error.
    GetFailure(String),
}

#[derive(Debug, Clone)]
struct MockObject {
    etag: String,
    storage_class: Option<String>,
    body: MockBody,
}

/// In-memory object store.
///
/// Objects live in a `BTreeMap` so listing order is deterministic. All
/// mutation goes through `&self` (interior mutability), which lets tests
/// modify the bucket between scans through the same handle they hand to
/// the scanner. The store counts `get_object` calls so tests can assert
/// that cache hits skip fetching entirely.
pub struct MockStore {
    objects: Mutex<BTreeMap<String, MockObject>>,
    authenticated: bool,
    page_size: usize,
    fail_after_pages: Mutex<Option<usize>>,
    pages_served: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MockStore {
    /// Create an empty, authenticated store with single-page listings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            authenticated: true,
            page_size: 1000,
            fail_after_pages: Mutex::new(None),
            pages_served: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Create a store whose credential check fails.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            ..Self::new()
        }
    }

    /// Limit listing pages to `page_size` objects.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Add or replace a standard-tier object with the given body.
    pub fn insert(&self, key: &str, etag: &str, body: &[u8]) {
        self.insert_object(key, etag, None, MockBody::Bytes(body.to_vec()));
    }

    /// Add or replace an object whose retrieval is denied.
    pub fn insert_denied(&self, key: &str, etag: &str) {
        self.insert_object(key, etag, None, MockBody::AccessDenied);
    }

    /// Add or replace an object whose retrieval fails generically.
    pub fn insert_failing(&self, key: &str, etag: &str, message: &str) {
        self.insert_object(key, etag, None, MockBody::GetFailure(message.to_string()));
    }

    /// Add or replace an object in a non-standard storage class.
    pub fn insert_tiered(&self, key: &str, etag: &str, storage_class: &str) {
        self.insert_object(
            key,
            etag,
            Some(storage_class.to_string()),
            MockBody::Bytes(Vec::new()),
        );
    }

    fn insert_object(&self, key: &str, etag: &str, storage_class: Option<String>, body: MockBody) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            MockObject {
                etag: etag.to_string(),
                storage_class,
                body,
            },
        );
    }

    /// Make the listing fail after serving this many pages.
    pub fn fail_listing_after(&self, pages: usize) {
        *self.fail_after_pages.lock().unwrap() = Some(pages);
    }

    /// Number of `get_object` calls made so far.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Reset the fetch-call and page counters between scans.
    pub fn reset_counters(&self) {
        self.fetch_calls.store(0, Ordering::SeqCst);
        self.pages_served.store(0, Ordering::SeqCst);
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn list_page(
        &self,
        _bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ListError> {
        let served = self.pages_served.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.fail_after_pages.lock().unwrap() {
            if served >= limit {
                return Err(ListError::Other("injected listing failure".to_string()));
            }
        }

        let offset: usize = continuation
            .as_deref()
            .map(|token| token.parse().unwrap_or(0))
            .unwrap_or(0);
        let objects = self.objects.lock().unwrap();
        let page: Vec<ListedObject> = objects
            .iter()
            .skip(offset)
            .take(self.page_size)
            .map(|(key, object)| ListedObject {
                key: key.clone(),
                etag: object.etag.clone(),
                storage_class: object.storage_class.clone(),
            })
            .collect();
        let consumed = offset + page.len();
        let next = (consumed < objects.len()).then(|| consumed.to_string());
        Ok(ObjectPage {
            objects: page,
            next,
        })
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().unwrap();
        let Some(object) = objects.get(key) else {
            return Err(FetchError::Other(format!("no such key: {key}")));
        };
        match &object.body {
            MockBody::Bytes(bytes) => Ok(bytes.clone()),
            MockBody::AccessDenied => Err(FetchError::AccessDenied),
            MockBody::GetFailure(message) => Err(FetchError::Other(message.clone())),
        }
    }
}
