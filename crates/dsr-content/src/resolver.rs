//! Lazy size resolution for a single datastream.

use std::sync::Arc;

use dsr_store::{HeadSource, StoreResult};
use dsr_types::DatastreamLocator;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::change::ChangeDetector;
use crate::content::ContentSize;

/// Reconciles the persisted size of a datastream with locally staged
/// content.
///
/// The persisted size is memoised in a `OnceCell<Option<u64>>`, which keeps
/// three states apart: not fetched yet, fetched with a size, and fetched
/// with no size. Failed fetches are not memoised. Concurrent first readers
/// share one fetch.
///
/// Not internally synchronised for mutation: staging, invalidation and
/// [`mark_persisted`](Self::mark_persisted) take `&mut self`.
pub struct SizeResolver<C, S: ?Sized, D> {
    locator: DatastreamLocator,
    new_record: bool,
    source: Arc<S>,
    detector: D,
    staged: Option<C>,
    persisted: OnceCell<Option<u64>>,
}

impl<C, S, D> SizeResolver<C, S, D>
where
    C: ContentSize,
    S: HeadSource + ?Sized,
    D: ChangeDetector<C>,
{
    /// Resolver for a datastream that does not exist remotely yet.
    pub fn new_record(locator: DatastreamLocator, source: Arc<S>, detector: D) -> Self {
        Self::with_state(locator, source, detector, true)
    }

    /// Resolver for a datastream already saved in the repository.
    pub fn persisted(locator: DatastreamLocator, source: Arc<S>, detector: D) -> Self {
        Self::with_state(locator, source, detector, false)
    }

    fn with_state(locator: DatastreamLocator, source: Arc<S>, detector: D, new_record: bool) -> Self {
        Self {
            locator,
            new_record,
            source,
            detector,
            staged: None,
            persisted: OnceCell::new(),
        }
    }

    pub fn locator(&self) -> &DatastreamLocator {
        &self.locator
    }

    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Size recorded by the repository.
    ///
    /// New records answer `None` without any request. Otherwise the first
    /// call issues one HEAD and later calls reuse its answer until
    /// [`invalidate`](Self::invalidate). Transport failures propagate as
    /// `RepositoryUnreachable`; a missing resource is `Ok(None)`.
    pub async fn persisted_size(&self) -> StoreResult<Option<u64>> {
        if self.new_record {
            debug!(uri = %self.locator, "new record; persisted size not fetched");
            return Ok(None);
        }
        let size = self
            .persisted
            .get_or_try_init(|| async {
                debug!(uri = %self.locator, "fetching persisted size");
                self.source.head_size(&self.locator).await
            })
            .await?;
        Ok(*size)
    }

    /// The memoised persisted size, without fetching. `None` means not
    /// fetched yet; `Some(None)` means fetched and unknown.
    pub fn cached_persisted_size(&self) -> Option<Option<u64>> {
        self.persisted.get().copied()
    }

    /// Staged content, whether or not it differs from what is persisted.
    pub fn staged(&self) -> Option<&C> {
        self.staged.as_ref()
    }

    /// Staged content, only if it differs from what is persisted.
    pub fn dirty_content(&self) -> Option<&C> {
        self.staged
            .as_ref()
            .filter(|content| self.detector.is_changed(content))
    }

    /// Size of the dirty content. `None` means nothing changed, not zero.
    pub fn dirty_size(&self) -> Option<u64> {
        self.dirty_content().map(ContentSize::content_size)
    }

    /// The dirty size when content changed, otherwise the persisted size.
    pub async fn size(&self) -> StoreResult<Option<u64>> {
        if let Some(dirty) = self.dirty_size() {
            return Ok(Some(dirty));
        }
        self.persisted_size().await
    }

    /// `true` only when the size is known to be zero.
    pub async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.size().await? == Some(0))
    }

    /// `true` only when the size is known and positive.
    pub async fn has_content(&self) -> StoreResult<bool> {
        Ok(matches!(self.size().await?, Some(n) if n > 0))
    }

    /// Stage new content, returning whatever was staged before.
    pub fn stage(&mut self, content: C) -> Option<C> {
        self.staged.replace(content)
    }

    /// Drop staged content without saving it.
    pub fn clear_staged(&mut self) -> Option<C> {
        self.staged.take()
    }

    /// Forget the memoised persisted size so the next read fetches again.
    pub fn invalidate(&mut self) {
        if self.persisted.take().is_some() {
            debug!(uri = %self.locator, "persisted size invalidated");
        }
    }

    /// Record that the staged content has been saved by the caller.
    ///
    /// The datastream leaves the new-record state, the staged content is
    /// handed back, and the persisted size will be fetched afresh.
    pub fn mark_persisted(&mut self) -> Option<C> {
        self.new_record = false;
        self.invalidate();
        self.staged.take()
    }
}

impl<C, S: ?Sized, D> std::fmt::Debug for SizeResolver<C, S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeResolver")
            .field("uri", &self.locator.uri())
            .field("new_record", &self.new_record)
            .field("staged", &self.staged.is_some())
            .field("persisted", &self.persisted.get())
            .finish()
    }
}
