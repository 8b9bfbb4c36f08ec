//! Datastream content handling.
//!
//! A datastream has two views of its size: what the repository says is
//! persisted, and what the caller has staged locally but not yet saved.
//! [`SizeResolver`] reconciles the two:
//!
//! - `persisted_size` is fetched lazily with one HEAD request and memoised
//!   until the resolver is invalidated. New records never hit the network.
//! - `dirty_size` is the size of staged content, but only when a
//!   [`ChangeDetector`] says it differs from what is persisted.
//! - `size` prefers the dirty size and falls back to the persisted size.
//!
//! Unknown (`None`) and zero are different answers throughout: `is_empty`
//! is true only for a known zero, `has_content` only for a known positive
//! size.
//!
//! [`Datastream`] ties a resolver to a locator and an allocated dsid.

pub mod change;
pub mod content;
pub mod datastream;
pub mod error;
pub mod resolver;

pub use change::{AlwaysChanged, ChangeDetector, DigestChangeDetector};
pub use content::{ContentHandle, ContentSize};
pub use datastream::Datastream;
pub use error::{ContentError, ContentResult};
pub use resolver::SizeResolver;
