//! Search-index synchronisation for repository objects.
//!
//! Objects describe themselves as flat [`IndexDocument`]s through the
//! [`Indexable`] trait. [`IndexSync`] pushes those documents into a
//! [`SearchIndex`] with a soft commit, and removes objects from both the
//! repository and the index on delete.
//!
//! # Modules
//!
//! - [`error`] — [`IndexError`] and the result alias
//! - [`document`] — [`IndexDocument`], [`Indexable`], [`CommitPolicy`]
//! - [`traits`] — The [`SearchIndex`] capability
//! - [`memory`] — [`InMemorySearchIndex`] for tests
//! - [`sync`] — [`IndexSync`], the update/delete hooks

pub mod document;
pub mod error;
pub mod memory;
pub mod sync;
pub mod traits;

pub use document::{CommitPolicy, IndexDocument, Indexable};
pub use error::{IndexError, IndexResult};
pub use memory::InMemorySearchIndex;
pub use sync::{DeleteOutcome, IndexSync};
pub use traits::SearchIndex;
