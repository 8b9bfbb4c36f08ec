//! Foundation types for datastream repositories.
//!
//! A repository object owns a set of named binary datastreams. Each datastream
//! is addressed by a short key, the *dsid*, which is appended to the owning
//! object's URI to locate the datastream remotely.
//!
//! # Modules
//!
//! - [`error`] — Error types for identifier construction
//! - [`dsid`] — [`DatastreamId`] and the dsid allocator ([`next_dsid`],
//!   [`DsidAllocator`])
//! - [`locator`] — [`ObjectLocator`] and [`DatastreamLocator`] URI builders
//!
//! # Allocation Rules
//!
//! 1. Only ids that start with the requested prefix are considered.
//! 2. The remainder after the prefix must be a positive decimal integer;
//!    anything else is a legacy id and is skipped, never reported.
//! 3. The next id is `prefix + (max + 1)`, with `max` defaulting to 0.
//! 4. Suffixes are never zero-padded.

pub mod dsid;
pub mod error;
pub mod locator;

pub use dsid::{next_dsid, next_id, DatastreamId, DsidAllocator};
pub use error::{TypeError, TypeResult};
pub use locator::{DatastreamLocator, ObjectLocator};
