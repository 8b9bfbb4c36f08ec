//! Index documents and the trait objects implement to produce them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IndexResult;

/// Field holding the document's unique key.
pub const ID_FIELD: &str = "id";

/// Field recording which model produced the document.
pub const MODEL_FIELD: &str = "has_model_ssim";

/// A flat, ordered search-index document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexDocument {
    fields: BTreeMap<String, Value>,
}

impl IndexDocument {
    /// A document keyed by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        let mut doc = Self::default();
        doc.insert(ID_FIELD, Value::String(id.into()));
        doc
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The document key, if it is a string.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> IndexResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How the index should make an update visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPolicy {
    pub soft_commit: bool,
}

impl CommitPolicy {
    /// Visible to searches promptly, durable on the next hard commit.
    pub const fn soft() -> Self {
        Self { soft_commit: true }
    }

    /// Leave visibility to the index's own commit schedule.
    pub const fn deferred() -> Self {
        Self { soft_commit: false }
    }

    /// Request parameters for this policy.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        if self.soft_commit {
            vec![("softCommit", "true".to_string())]
        } else {
            Vec::new()
        }
    }
}

impl Default for CommitPolicy {
    fn default() -> Self {
        Self::soft()
    }
}

/// An object that can be written to the search index.
pub trait Indexable {
    /// The qualified model name recorded in the model field, e.g.
    /// `SampleModel::CamelCased`.
    fn class_uri() -> &'static str
    where
        Self: Sized;

    /// Unique key of the object in the index.
    fn index_id(&self) -> String;

    /// Extra fields beyond the id and model.
    fn index_fields(&self, _doc: &mut IndexDocument) {}

    /// Build the full index document.
    fn to_index_document(&self) -> IndexDocument
    where
        Self: Sized,
    {
        let mut doc = IndexDocument::new(self.index_id()).with(MODEL_FIELD, Self::class_uri());
        self.index_fields(&mut doc);
        doc
    }
}
