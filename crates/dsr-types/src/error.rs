//! Error types for identifier construction.

use thiserror::Error;

/// Errors raised when building identifiers or locators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A datastream id must not be empty.
    #[error("datastream id must not be empty")]
    EmptyDsid,

    /// The datastream id contains characters that cannot appear in a single
    /// URI path segment.
    #[error("invalid datastream id {dsid:?}: {reason}")]
    InvalidDsid { dsid: String, reason: String },

    /// An object id must not be empty.
    #[error("object id must not be empty")]
    EmptyObjectId,
}

/// Convenience type alias for identifier operations.
pub type TypeResult<T> = std::result::Result<T, TypeError>;
