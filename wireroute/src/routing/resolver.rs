//! Circuit Route Resolver
//!
//! Turns a circuit into a [`Route`]: one canonical (lightest) path from each
//! terminal device back to the circuit's base equipment, unioned.

use tracing::debug;

use super::adapter::ConnectivityAdapter;
use super::paths::shortest_path;
use super::route::Route;
use super::RouteError;
use crate::model::{Category, ConnectorKind, ElementId, GraphSource};

pub struct CircuitRouteResolver<'a, S: GraphSource + ?Sized> {
    adapter: ConnectivityAdapter<'a, S>,
}

impl<'a, S: GraphSource + ?Sized> CircuitRouteResolver<'a, S> {
    pub fn new(source: &'a S, routable: &'a [ConnectorKind]) -> Self {
        Self {
            adapter: ConnectivityAdapter::new(source, routable),
        }
    }

    pub fn adapter(&self) -> &ConnectivityAdapter<'a, S> {
        &self.adapter
    }

    /// Route of `circuit_name`, optionally restricted to terminals of one category.
    ///
    /// Terminals without any path to the base equipment are left out; an
    /// empty route is a valid answer.
    pub fn resolve_route(
        &self,
        circuit_name: &str,
        category: Option<Category>,
    ) -> Result<Route, RouteError> {
        let source = self.adapter.source();
        let circuit = source
            .circuit(circuit_name)
            .ok_or_else(|| RouteError::CircuitNotFound(circuit_name.to_string()))?;
        let base = circuit
            .base_equipment
            .ok_or_else(|| RouteError::CircuitNotFound(circuit_name.to_string()))?;

        let mut terminals: Vec<ElementId> = Vec::new();
        for member in &circuit.members {
            if let Some(wanted) = category {
                if source.category(*member) != Some(wanted) {
                    continue;
                }
            }
            let terminal = self.adapter.owner(*member);
            if !terminals.contains(&terminal) {
                terminals.push(terminal);
            }
        }

        let mut route = Route::new();
        for terminal in terminals {
            match shortest_path(&self.adapter, terminal, base) {
                Some(selected) => route.union_path(&selected.path),
                None => debug!(
                    "No path from {} to base {} in circuit {}",
                    terminal, base, circuit_name
                ),
            }
        }

        debug!(
            "Resolved circuit {} ({} elements)",
            circuit_name,
            route.len()
        );
        Ok(route)
    }

    /// Route of the circuit two elements share.
    ///
    /// Both elements must carry the same non-empty circuit tag.
    pub fn resolve_route_between(&self, a: ElementId, b: ElementId) -> Result<Route, RouteError> {
        let source = self.adapter.source();
        let tag = |id: ElementId| {
            source
                .circuit_tag(id)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        };

        match (tag(a), tag(b)) {
            (Some(first), Some(second)) if first == second => self.resolve_route(&first, None),
            _ => Err(RouteError::MismatchedCircuit { first: a, second: b }),
        }
    }
}
