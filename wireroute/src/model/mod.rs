//! Host Model Module
//!
//! This module provides the engine's view of the host CAD document:
//! elements, connectors, circuits and wiring slots. The engine only ever
//! talks to the host through the traits in [`source`]; [`Document`] is an
//! in-memory host used by the CLI, the tests and the benches.

pub mod document;
pub mod schema;
pub mod source;

// Re-export main types for convenience
pub use document::{Document, DocumentStats};
pub use schema::*;
pub use source::{GraphSource, SlotWriter, Transactional, WriteError};
