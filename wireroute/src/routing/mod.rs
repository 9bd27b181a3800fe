//! Route resolution over the host connectivity graph.

pub mod adapter;
pub mod paths;
pub mod resolver;
pub mod route;
pub mod switches;

use thiserror::Error;

use crate::model::ElementId;

pub use adapter::{ConnectivityAdapter, Neighbor};
pub use paths::{enumerate_paths, first_path, select_shortest, shortest_path, Path, ShortestPath};
pub use resolver::CircuitRouteResolver;
pub use route::Route;
pub use switches::{
    collect_switch_groups, resolve_switch_legs, return_conductors, LegKind, SwitchGroup,
    SwitchGroupRoutes, SwitchLeg, SwitchTopology,
};

/// Errors surfaced by route queries. A missing path is not one of them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("Circuit '{0}' not found or has no base equipment")]
    CircuitNotFound(String),

    #[error("Elements {first} and {second} do not share a circuit")]
    MismatchedCircuit { first: ElementId, second: ElementId },
}
