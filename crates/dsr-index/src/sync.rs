//! Persistence hooks that keep the search index in step with the repository.

use std::sync::Arc;

use dsr_store::ObjectRemover;
use dsr_types::ObjectLocator;
use tracing::{debug, info};

use crate::document::{CommitPolicy, IndexDocument, Indexable};
use crate::error::IndexResult;
use crate::traits::SearchIndex;

/// What a delete actually removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed_from_repository: bool,
    pub removed_from_index: bool,
}

/// Update and delete hooks over an injected index and repository.
pub struct IndexSync<I: ?Sized, R: ?Sized> {
    index: Arc<I>,
    repository: Arc<R>,
    policy: CommitPolicy,
}

impl<I, R> IndexSync<I, R>
where
    I: SearchIndex + ?Sized,
    R: ObjectRemover + ?Sized,
{
    /// Hooks that soft-commit every update.
    pub fn new(index: Arc<I>, repository: Arc<R>) -> Self {
        Self {
            index,
            repository,
            policy: CommitPolicy::soft(),
        }
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// Build the object's index document and add it to the index.
    pub async fn update_index<T: Indexable>(&self, object: &T) -> IndexResult<IndexDocument> {
        let doc = object.to_index_document();
        self.index.add(std::slice::from_ref(&doc), self.policy).await?;
        debug!(id = ?doc.id(), soft_commit = self.policy.soft_commit, "index updated");
        Ok(doc)
    }

    /// Delete the object from the repository, then from the index.
    ///
    /// New records were never written to the repository, so only the index
    /// is touched for them. A repository failure stops the delete before
    /// the index is changed.
    pub async fn delete<T: Indexable>(
        &self,
        object: &T,
        locator: &ObjectLocator,
        new_record: bool,
    ) -> IndexResult<DeleteOutcome> {
        let removed_from_repository = if new_record {
            false
        } else {
            self.repository.delete(locator).await?
        };
        let id = object.index_id();
        let removed_from_index = self.index.delete(&id).await?;
        info!(
            %id,
            uri = %locator,
            removed_from_repository,
            removed_from_index,
            "object deleted"
        );
        Ok(DeleteOutcome {
            removed_from_repository,
            removed_from_index,
        })
    }
}
