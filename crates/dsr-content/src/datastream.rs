//! A named binary datastream attached to a repository object.

use std::fmt;
use std::sync::Arc;

use dsr_store::{HeadSource, StoreResult};
use dsr_types::{next_id, DatastreamId, DatastreamLocator, ObjectLocator};
use tracing::debug;

use crate::change::DigestChangeDetector;
use crate::content::ContentHandle;
use crate::error::ContentResult;
use crate::resolver::SizeResolver;

/// Prefix used for generated dsids when the caller does not pick one.
pub const DEFAULT_DSID_PREFIX: &str = "DS";

/// A datastream: its locator, staged content and descriptive metadata.
///
/// Size questions are answered by the embedded [`SizeResolver`], which uses
/// a [`DigestChangeDetector`] to decide whether staged bytes differ from the
/// content last seen in the repository.
pub struct Datastream<S: ?Sized> {
    resolver: SizeResolver<ContentHandle, S, DigestChangeDetector>,
    original_name: Option<String>,
    mime_type: Option<String>,
}

impl<S: HeadSource + ?Sized> Datastream<S> {
    /// A datastream with a caller-chosen dsid.
    pub fn new(object: &ObjectLocator, dsid: DatastreamId, source: Arc<S>, new_record: bool) -> Self {
        let locator = object.datastream(dsid);
        let detector = DigestChangeDetector::unknown();
        let resolver = if new_record {
            SizeResolver::new_record(locator, source, detector)
        } else {
            SizeResolver::persisted(locator, source, detector)
        };
        Self {
            resolver,
            original_name: None,
            mime_type: None,
        }
    }

    /// A new datastream whose dsid continues the `prefix` sequence among the
    /// object's existing dsids.
    pub fn with_generated_dsid<I, T>(
        object: &ObjectLocator,
        existing: I,
        prefix: &str,
        source: Arc<S>,
    ) -> ContentResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let dsid = DatastreamId::new(next_id(existing, prefix))?;
        debug!(object = %object, %dsid, "generated dsid");
        Ok(Self::new(object, dsid, source, true))
    }

    pub fn dsid(&self) -> &DatastreamId {
        self.resolver.locator().dsid()
    }

    pub fn locator(&self) -> &DatastreamLocator {
        self.resolver.locator()
    }

    pub fn uri(&self) -> String {
        self.locator().uri()
    }

    /// The dsid in URL-parameter form.
    pub fn to_param(&self) -> String {
        self.dsid().to_param()
    }

    /// Binary datastreams carry content, not descriptive metadata.
    pub fn is_metadata(&self) -> bool {
        false
    }

    pub fn is_new_record(&self) -> bool {
        self.resolver.is_new_record()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn set_original_name(&mut self, name: impl Into<String>) {
        self.original_name = Some(name.into());
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
        self.mime_type = Some(mime_type.into());
    }

    /// Stage new content.
    pub fn set_content(&mut self, content: impl Into<ContentHandle>) {
        self.resolver.stage(content.into());
    }

    /// Staged content, changed or not.
    pub fn content(&self) -> Option<&ContentHandle> {
        self.resolver.staged()
    }

    /// Record the bytes currently persisted, e.g. after loading them.
    pub fn set_loaded_content(&mut self, persisted: &[u8]) {
        self.resolver.detector_mut().set_persisted(persisted);
    }

    pub async fn persisted_size(&self) -> StoreResult<Option<u64>> {
        self.resolver.persisted_size().await
    }

    pub fn dirty_content(&self) -> Option<&ContentHandle> {
        self.resolver.dirty_content()
    }

    pub fn dirty_size(&self) -> Option<u64> {
        self.resolver.dirty_size()
    }

    pub async fn size(&self) -> StoreResult<Option<u64>> {
        self.resolver.size().await
    }

    pub async fn is_empty(&self) -> StoreResult<bool> {
        self.resolver.is_empty().await
    }

    pub async fn has_content(&self) -> StoreResult<bool> {
        self.resolver.has_content().await
    }

    /// Record that the caller saved the staged content. In-memory content
    /// becomes the new persisted baseline for change detection.
    pub fn mark_persisted(&mut self) -> Option<ContentHandle> {
        let saved = self.resolver.mark_persisted();
        match saved.as_ref().and_then(ContentHandle::as_bytes) {
            Some(bytes) => self.resolver.detector_mut().set_persisted(bytes),
            None if saved.is_some() => self.resolver.detector_mut().clear(),
            None => {}
        }
        saved
    }

    /// Drop staged content and forget the memoised persisted size.
    pub fn reload(&mut self) {
        self.resolver.clear_staged();
        self.resolver.invalidate();
    }
}

impl<S: HeadSource + ?Sized> fmt::Display for Datastream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Datastream uri=\"{}\" >", self.resolver.locator())
    }
}

impl<S: HeadSource + ?Sized> fmt::Debug for Datastream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
