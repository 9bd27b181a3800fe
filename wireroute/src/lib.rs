//! WireRoute - circuit route resolution for building electrical models
//!
//! This library finds the conduit runs that carry each electrical circuit
//! from its devices back to the panel, and records the result as wiring
//! data on the conduit segments.
//!
//! # Quick Start
//!
//! ```no_run
//! use wireroute::{Document, EngineConfig, WiringEngine};
//! use std::path::Path;
//!
//! let document = Document::from_file(Path::new("building.json")).unwrap();
//! let engine = WiringEngine::new(EngineConfig::default());
//!
//! for name in engine.list_circuit_names(&document) {
//!     let route = engine.resolve_route(&document, &name, None).unwrap();
//!     println!("{}: {} elements", name, route.len());
//! }
//! ```
//!
//! # Features
//!
//! - **Route resolution**: lightest path from every circuit device to its panel
//! - **Switch topologies**: simple, three-way and four-way lighting legs
//! - **Route stores**: computed and user-overridden routes, persisted as JSON
//! - **Slot allocation**: conflict-free wiring data on conduit segments

pub mod config;
pub mod core;
pub mod model;
pub mod routing;
pub mod store;
pub mod wiring;

// Re-export main types
pub use config::EngineConfig;
pub use core::{EffectiveRoute, WireRouteError, WiringEngine};
pub use model::{
    Category, Circuit, Document, ElementId, GraphSource, ModelElement, SlotData, SlotWriter,
    Transactional, WriteError,
};
pub use routing::{Path, Route, RouteError, SwitchGroupRoutes, SwitchTopology};
pub use store::{RouteOrigin, RouteStore, RouteStores};
pub use wiring::{AllocationReport, FillReport, WiringAttributes};

/// Load a document file (convenience wrapper).
pub fn load_document(path: &std::path::Path) -> Result<Document, WireRouteError> {
    Document::from_file(path)
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::{EffectiveRoute, WireRouteError, WiringEngine};
    pub use crate::model::{
        Category, Circuit, ConnectorKind, Document, ElementId, GraphSource, ModelElement,
        SlotData, SlotWriter, Transactional,
    };
    pub use crate::routing::{LegKind, Route, RouteError, SwitchTopology};
    pub use crate::store::RouteOrigin;
    pub use crate::wiring::{FillReport, WiringAttributes};
}
