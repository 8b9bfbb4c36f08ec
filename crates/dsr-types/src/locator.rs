//! URI builders for repository objects and their datastreams.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dsid::DatastreamId;
use crate::error::{TypeError, TypeResult};

/// Locates a repository object: the repository base URI plus the object id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocator {
    base: String,
    object_id: String,
}

impl ObjectLocator {
    /// Create a locator. `base` is the repository root including any base
    /// path, e.g. `http://localhost:8983/fedora/rest/test`.
    pub fn new(base: impl Into<String>, object_id: impl Into<String>) -> TypeResult<Self> {
        let object_id: String = object_id.into();
        let object_id = object_id.trim_matches('/').to_string();
        if object_id.is_empty() {
            return Err(TypeError::EmptyObjectId);
        }
        let base: String = base.into();
        let base = base.trim_end_matches('/').to_string();
        Ok(Self { base, object_id })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Absolute URI of the object.
    pub fn uri(&self) -> String {
        format!("{}/{}", self.base, self.object_id)
    }

    /// Locator of a datastream owned by this object.
    pub fn datastream(&self, dsid: DatastreamId) -> DatastreamLocator {
        DatastreamLocator {
            object: self.clone(),
            dsid,
        }
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Locates a datastream: its owning object plus the dsid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatastreamLocator {
    object: ObjectLocator,
    dsid: DatastreamId,
}

impl DatastreamLocator {
    pub fn object(&self) -> &ObjectLocator {
        &self.object
    }

    pub fn dsid(&self) -> &DatastreamId {
        &self.dsid
    }

    /// Absolute URI of the datastream.
    pub fn uri(&self) -> String {
        format!("{}/{}", self.object.uri(), self.dsid)
    }

    /// The URI with scheme and authority removed (`/fedora/rest/test/1234/abcd`).
    pub fn relative_path(&self) -> String {
        relative_path(&self.uri())
    }
}

impl fmt::Display for DatastreamLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Strip `scheme://authority` from a URI, leaving the absolute path.
pub fn relative_path(uri: &str) -> String {
    let without_scheme = match uri.split_once("://") {
        Some((_, rest)) => rest,
        None => return uri.to_string(),
    };
    match without_scheme.find('/') {
        Some(idx) => without_scheme[idx..].to_string(),
        None => "/".to_string(),
    }
}
