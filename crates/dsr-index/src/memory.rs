//! In-memory search index for testing and ephemeral use.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::document::{CommitPolicy, IndexDocument};
use crate::error::{IndexError, IndexResult};
use crate::traits::SearchIndex;

/// An in-memory implementation of [`SearchIndex`].
///
/// Documents live in a `BTreeMap` behind a `RwLock`. Every `add` records
/// the commit policy it was called with so tests can assert on it.
/// A poisoned lock panics on every accessor.
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    docs: RwLock<BTreeMap<String, IndexDocument>>,
    commits: RwLock<Vec<CommitPolicy>>,
    offline: AtomicBool,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<IndexDocument> {
        self.docs.read().expect("lock poisoned").get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commit policies of every `add`, oldest first.
    pub fn commits(&self) -> Vec<CommitPolicy> {
        self.commits.read().expect("lock poisoned").clone()
    }

    /// Simulate the index going away (or coming back).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> IndexResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("index is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn add(&self, docs: &[IndexDocument], policy: CommitPolicy) -> IndexResult<()> {
        self.check_online()?;
        let keyed = docs
            .iter()
            .map(|doc| {
                doc.id()
                    .map(|id| (id.to_string(), doc.clone()))
                    .ok_or_else(|| IndexError::Serialization("document has no id".into()))
            })
            .collect::<IndexResult<Vec<_>>>()?;
        self.docs.write().expect("lock poisoned").extend(keyed);
        self.commits.write().expect("lock poisoned").push(policy);
        Ok(())
    }

    async fn delete(&self, id: &str) -> IndexResult<bool> {
        self.check_online()?;
        let mut map = self.docs.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_and_get() {
        let index = InMemorySearchIndex::new();
        index
            .add(&[IndexDocument::new("1").with("title", "one")], CommitPolicy::soft())
            .await
            .unwrap();

        let doc = index.get("1").unwrap();
        assert_eq!(doc.id(), Some("1"));
        assert_eq!(index.commits(), vec![CommitPolicy::soft()]);
    }

    #[tokio::test]
    async fn add_replaces_existing_document() {
        let index = InMemorySearchIndex::new();
        index.add(&[IndexDocument::new("1").with("v", 1)], CommitPolicy::soft()).await.unwrap();
        index.add(&[IndexDocument::new("1").with("v", 2)], CommitPolicy::deferred()).await.unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1").unwrap().get("v"), Some(&serde_json::json!(2)));
        assert_eq!(index.commits().len(), 2);
    }

    #[tokio::test]
    async fn reject_document_without_id() {
        let index = InMemorySearchIndex::new();
        let err = index
            .add(&[IndexDocument::default()], CommitPolicy::soft())
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Serialization(_)));
        assert!(index.commits().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let index = InMemorySearchIndex::new();
        index.add(&[IndexDocument::new("1")], CommitPolicy::soft()).await.unwrap();
        assert!(index.delete("1").await.unwrap());
        assert!(!index.delete("1").await.unwrap());
        assert!(index.is_empty());
    }

    #[test]
    #[should_panic(expected = "lock poisoned")]
    fn poisoned_lock_is_not_reported_as_empty() {
        let index = std::sync::Arc::new(InMemorySearchIndex::new());
        let writer = index.clone();
        let _ = std::thread::spawn(move || {
            let _guard = writer.docs.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        index.len();
    }

    #[tokio::test]
    async fn offline_index_is_unavailable() {
        let index = InMemorySearchIndex::new();
        index.set_offline(true);
        let err = index.delete("1").await.unwrap_err();
        assert!(matches!(err, IndexError::Unavailable(_)));
    }
}
