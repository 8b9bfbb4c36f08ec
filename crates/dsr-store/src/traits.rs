//! Capabilities a datastream needs from the remote repository.

use async_trait::async_trait;
use dsr_types::{DatastreamLocator, ObjectLocator};

use crate::error::{StoreError, StoreResult};

/// Status line and declared length of a metadata-only (HEAD) request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    pub content_length: Option<u64>,
}

impl HeadResponse {
    pub fn new(status: u16, content_length: Option<u64>) -> Self {
        Self {
            status,
            content_length,
        }
    }

    /// A `200 OK` carrying `Content-Length: len`.
    pub fn ok(len: u64) -> Self {
        Self::new(200, Some(len))
    }

    /// A `404 Not Found`.
    pub fn not_found() -> Self {
        Self::new(404, None)
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.status, 404 | 410)
    }

    /// Interpret the response as a persisted size.
    ///
    /// - 2xx with a length: `Some(len)`; zero is a real size.
    /// - 2xx without a length: `None`, the size is not declared.
    /// - 404/410: `None`, the content does not exist.
    /// - 5xx: [`StoreError::RepositoryUnreachable`].
    /// - anything else: [`StoreError::UnexpectedStatus`].
    pub fn declared_size(&self, locator: &DatastreamLocator) -> StoreResult<Option<u64>> {
        if self.is_success() {
            Ok(self.content_length)
        } else if self.is_not_found() {
            Ok(None)
        } else {
            Err(StoreError::from_status(locator, self.status))
        }
    }
}

/// Metadata-only fetch against the repository.
///
/// Implementations must not retry and must report transport failures as
/// [`StoreError::RepositoryUnreachable`] rather than a "not found" response.
#[async_trait]
pub trait HeadSource: Send + Sync {
    /// Issue a HEAD request for the datastream.
    async fn head(&self, locator: &DatastreamLocator) -> StoreResult<HeadResponse>;

    /// HEAD the datastream and interpret the result as a size.
    async fn head_size(&self, locator: &DatastreamLocator) -> StoreResult<Option<u64>> {
        self.head(locator).await?.declared_size(locator)
    }
}

/// Deletes whole objects from the repository.
#[async_trait]
pub trait ObjectRemover: Send + Sync {
    /// Delete the object and everything under it. Returns `true` if the
    /// object existed.
    async fn delete(&self, locator: &ObjectLocator) -> StoreResult<bool>;
}

#[async_trait]
impl<T: HeadSource + ?Sized> HeadSource for std::sync::Arc<T> {
    async fn head(&self, locator: &DatastreamLocator) -> StoreResult<HeadResponse> {
        (**self).head(locator).await
    }
}

#[async_trait]
impl<T: ObjectRemover + ?Sized> ObjectRemover for std::sync::Arc<T> {
    async fn delete(&self, locator: &ObjectLocator) -> StoreResult<bool> {
        (**self).delete(locator).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsr_types::DatastreamId;

    fn locator() -> DatastreamLocator {
        ObjectLocator::new("http://localhost:8983/fedora/rest/test", "1234")
            .unwrap()
            .datastream(DatastreamId::new("abcd").unwrap())
    }

    #[test]
    fn success_with_length_is_a_size() {
        assert_eq!(HeadResponse::ok(9999).declared_size(&locator()).unwrap(), Some(9999));
        assert_eq!(HeadResponse::ok(0).declared_size(&locator()).unwrap(), Some(0));
    }

    #[test]
    fn success_without_length_is_unknown() {
        let resp = HeadResponse::new(204, None);
        assert_eq!(resp.declared_size(&locator()).unwrap(), None);
    }

    #[test]
    fn not_found_is_a_value() {
        assert_eq!(HeadResponse::not_found().declared_size(&locator()).unwrap(), None);
        assert_eq!(HeadResponse::new(410, None).declared_size(&locator()).unwrap(), None);
    }

    #[test]
    fn server_errors_are_unreachable() {
        for status in [500, 502, 503] {
            let err = HeadResponse::new(status, None).declared_size(&locator()).unwrap_err();
            assert!(err.is_unreachable(), "{status}");
        }
    }

    #[test]
    fn client_errors_are_unexpected_status() {
        for status in [400, 401, 403, 302] {
            let err = HeadResponse::new(status, None).declared_size(&locator()).unwrap_err();
            assert!(!err.is_unreachable(), "{status}");
            assert_eq!(err.unexpected_status(), Some(status));
        }
    }
}
