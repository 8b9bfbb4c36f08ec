//! The [`SearchIndex`] trait defining the index interface.

use async_trait::async_trait;

use crate::document::{CommitPolicy, IndexDocument};
use crate::error::IndexResult;

/// A search index that accepts flat documents keyed by id.
///
/// Adding a document whose id already exists replaces it.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Add or replace documents.
    async fn add(&self, docs: &[IndexDocument], policy: CommitPolicy) -> IndexResult<()>;

    /// Remove the document with this id. Returns `true` if it existed.
    async fn delete(&self, id: &str) -> IndexResult<bool>;
}
