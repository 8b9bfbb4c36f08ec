//! Remote repository capabilities for datastreams.
//!
//! The size resolver never talks HTTP directly. It is handed a
//! [`HeadSource`] which answers metadata-only requests for a datastream
//! locator. This crate defines that capability, the [`ObjectRemover`]
//! capability used when deleting objects, and two backends:
//!
//! - [`InMemoryRepository`] -- `HashMap`-based repository for tests and
//!   embedding, with call counting and outage injection
//! - [`HttpRepository`] -- `ureq`-backed client for a live repository
//!
//! # Error Rules
//!
//! 1. "Not found" is a value (`None` size), never an error.
//! 2. Transport failures and 5xx surface as
//!    [`StoreError::RepositoryUnreachable`]; other statuses the repository
//!    answered with surface as [`StoreError::UnexpectedStatus`].
//! 3. Nothing is retried here. Retry policy belongs to the caller.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use config::RepositoryConfig;
pub use error::{StoreError, StoreResult};
pub use http::HttpRepository;
pub use memory::InMemoryRepository;
pub use traits::{HeadResponse, HeadSource, ObjectRemover};
