use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use dsr_types::locator::relative_path;
use dsr_types::{DatastreamLocator, ObjectLocator};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{HeadResponse, HeadSource, ObjectRemover};

/// In-memory, HashMap-based repository.
///
/// Intended for tests and embedding. Resources are keyed by their relative
/// path (`/fedora/rest/test/1234/abcd`) and carry an optional declared
/// length. Every HEAD is counted, and the whole repository can be taken
/// offline to simulate transport failures.
pub struct InMemoryRepository {
    resources: RwLock<HashMap<String, Option<u64>>>,
    head_calls: AtomicUsize,
    offline: AtomicBool,
}

impl InMemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
            head_calls: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Store a datastream with a declared length.
    pub fn put(&self, locator: &DatastreamLocator, len: u64) {
        self.put_raw(&locator.relative_path(), Some(len));
    }

    /// Store a datastream whose responses carry no `Content-Length`.
    pub fn put_without_length(&self, locator: &DatastreamLocator) {
        self.put_raw(&locator.relative_path(), None);
    }

    /// Store a resource by relative path.
    pub fn put_raw(&self, path: &str, len: Option<u64>) {
        self.resources
            .write()
            .expect("lock poisoned")
            .insert(path.to_string(), len);
    }

    /// Returns `true` if the datastream exists.
    pub fn contains(&self, locator: &DatastreamLocator) -> bool {
        self.resources
            .read()
            .expect("lock poisoned")
            .contains_key(&locator.relative_path())
    }

    /// Number of resources currently stored.
    pub fn len(&self) -> usize {
        self.resources.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of HEAD requests served so far, including failed ones.
    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    /// Simulate the repository going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self, locator: &str) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unreachable(locator, "connection refused"));
        }
        Ok(())
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HeadSource for InMemoryRepository {
    async fn head(&self, locator: &DatastreamLocator) -> StoreResult<HeadResponse> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online(&locator.uri())?;
        let path = locator.relative_path();
        let map = self.resources.read().expect("lock poisoned");
        let resp = match map.get(&path) {
            Some(len) => HeadResponse::new(200, *len),
            None => HeadResponse::not_found(),
        };
        debug!(%path, status = resp.status, "in-memory HEAD");
        Ok(resp)
    }
}

#[async_trait]
impl ObjectRemover for InMemoryRepository {
    async fn delete(&self, locator: &ObjectLocator) -> StoreResult<bool> {
        self.check_online(&locator.uri())?;
        let root = relative_path(&locator.uri());
        let nested = format!("{root}/");
        let mut map = self.resources.write().expect("lock poisoned");
        let before = map.len();
        map.retain(|path, _| path != &root && !path.starts_with(&nested));
        Ok(map.len() != before)
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("resource_count", &self.len())
            .field("head_calls", &self.head_calls())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsr_types::DatastreamId;

    const BASE: &str = "http://localhost:8983/fedora/rest/test";

    fn object(id: &str) -> ObjectLocator {
        ObjectLocator::new(BASE, id).unwrap()
    }

    fn ds(object_id: &str, dsid: &str) -> DatastreamLocator {
        object(object_id).datastream(DatastreamId::new(dsid).unwrap())
    }

    #[tokio::test]
    async fn head_existing_datastream() {
        let repo = InMemoryRepository::new();
        repo.put(&ds("1234", "abcd"), 9999);

        let resp = repo.head(&ds("1234", "abcd")).await.unwrap();
        assert_eq!(resp, HeadResponse::ok(9999));
        assert_eq!(repo.head_size(&ds("1234", "abcd")).await.unwrap(), Some(9999));
        assert_eq!(repo.head_calls(), 2);
    }

    #[tokio::test]
    async fn head_missing_datastream_is_not_found() {
        let repo = InMemoryRepository::new();
        let resp = repo.head(&ds("1234", "nope")).await.unwrap();
        assert!(resp.is_not_found());
        assert_eq!(repo.head_size(&ds("1234", "nope")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn head_without_length() {
        let repo = InMemoryRepository::new();
        repo.put_without_length(&ds("1234", "abcd"));
        assert_eq!(repo.head_size(&ds("1234", "abcd")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_repository_is_unreachable() {
        let repo = InMemoryRepository::new();
        repo.put(&ds("1234", "abcd"), 1);
        repo.set_offline(true);

        let err = repo.head(&ds("1234", "abcd")).await.unwrap_err();
        assert!(err.is_unreachable());
        assert_eq!(repo.head_calls(), 1);

        repo.set_offline(false);
        assert!(repo.head(&ds("1234", "abcd")).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_object_and_datastreams_only() {
        let repo = InMemoryRepository::new();
        repo.put(&ds("1234", "abcd"), 1);
        repo.put(&ds("1234", "FOO1"), 2);
        repo.put(&ds("12345", "abcd"), 3);

        assert!(repo.delete(&object("1234")).await.unwrap());
        assert!(!repo.contains(&ds("1234", "abcd")));
        assert!(!repo.contains(&ds("1234", "FOO1")));
        assert!(repo.contains(&ds("12345", "abcd")));

        assert!(!repo.delete(&object("1234")).await.unwrap());
    }
}
