//! Domain model for the wildcam TV stack pipeline.
//!
//! This crate has zero internal deps so it can be shared by the event
//! channels, the pipeline and any transport implementation.
//!
//! - [`selection`] — mutable selection criteria, partial updates, the
//!   duplicate-suppression key and the retrieval validity predicate.
//! - [`query`] — the transport-facing [`StackQuery`](query::StackQuery).
//! - [`stack`] — the ordered image sequence handed to playback.

pub mod error;
pub mod query;
pub mod selection;
pub mod stack;
pub mod types;
