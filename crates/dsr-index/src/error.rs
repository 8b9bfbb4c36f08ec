//! Error types for index operations.

use thiserror::Error;

/// Errors that can occur while synchronising the search index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The search index could not be reached.
    #[error("search index unavailable: {0}")]
    Unavailable(String),

    /// A document could not be serialised.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The repository side of an operation failed.
    #[error("store error: {0}")]
    Store(#[from] dsr_store::StoreError),
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience type alias for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;
