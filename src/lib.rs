//! A minimal full-text search engine that persists an inverted index and a
//! document store on the local filesystem and answers ranked keyword
//! queries.
//!
//! The engine is deliberately small: an [`analyzer`] turns raw text into
//! positional front n-grams, a [`segment`] store persists those as sorted,
//! human-readable shard files, a [`document_store`] holds the raw payloads,
//! [`stats`] tracks how many documents have been indexed, and [`scorer`]
//! ranks matches BM25-style. [`Engine`] wires the four stores together
//! behind `index`/`search`.
//!
//! Each `Engine` is parameterized by a single base directory; there is no
//! process-wide state, so independent corpora live in independent
//! directories and independent `Engine` instances.

pub mod analyzer;
pub mod document_store;
pub mod engine;
pub mod error;
pub mod scorer;
pub mod segment;
pub mod stats;

pub use engine::{Engine, SearchResult};
pub use error::{Error, Result, SchemaReason};
