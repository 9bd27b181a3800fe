//! Connectivity view over a [`GraphSource`].
//!
//! All nested-part handling lives here: every id that leaves the adapter is
//! already the top-level owner, so traversal code never sees sub-parts.

use std::collections::HashSet;

use crate::model::{Category, ConnectorKind, ConnectorRef, ElementId, GraphSource};

/// Upper bound on nested assembly depth; guards against cyclic parent data.
const MAX_NESTING: usize = 16;

/// A neighbor reached through one active connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Neighbor {
    pub element: ElementId,
    pub via: ConnectorRef,
}

pub struct ConnectivityAdapter<'a, S: GraphSource + ?Sized> {
    source: &'a S,
    routable: &'a [ConnectorKind],
}

impl<'a, S: GraphSource + ?Sized> ConnectivityAdapter<'a, S> {
    pub fn new(source: &'a S, routable: &'a [ConnectorKind]) -> Self {
        Self { source, routable }
    }

    pub fn source(&self) -> &'a S {
        self.source
    }

    /// Top-level owner of `id`, following the nested-part chain.
    ///
    /// The chain stops at the last live element, so a part whose assembly
    /// was deleted becomes its own owner.
    pub fn owner(&self, id: ElementId) -> ElementId {
        let mut current = id;
        for _ in 0..MAX_NESTING {
            match self.source.super_component(current) {
                Some(parent) if parent != current && self.source.contains(parent) => {
                    current = parent
                }
                _ => break,
            }
        }
        current
    }

    /// The owner itself followed by every part nested inside it.
    fn assembly(&self, owner: ElementId) -> Vec<ElementId> {
        let mut parts = vec![owner];
        let mut next = 0;
        while next < parts.len() && parts.len() < MAX_NESTING * MAX_NESTING {
            for child in self.source.sub_components(parts[next]) {
                if !parts.contains(&child) {
                    parts.push(child);
                }
            }
            next += 1;
        }
        parts
    }

    /// Elements joined to `id` through connected connectors of a routable kind.
    ///
    /// Connectors of nested sub-parts count as connectors of their assembly.
    /// Peers are reported by their top-level owner, once per connector pair.
    /// A vanished element has no neighbors.
    pub fn active_neighbors(&self, id: ElementId) -> Vec<Neighbor> {
        let element = self.owner(id);
        if !self.source.contains(element) {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut neighbors = Vec::new();

        let connectors = self
            .assembly(element)
            .into_iter()
            .flat_map(|part| self.source.connectors(part));

        for connector in connectors {
            if !connector.is_active(self.routable) {
                continue;
            }
            for peer in self.source.peers(connector.reference) {
                if !self.source.contains(peer.owner) {
                    continue;
                }
                let peer_owner = self.owner(peer.owner);
                if peer_owner == element || !self.source.contains(peer_owner) {
                    continue;
                }
                let neighbor = Neighbor {
                    element: peer_owner,
                    via: connector.reference,
                };
                if seen.insert(neighbor) {
                    neighbors.push(neighbor);
                }
            }
        }

        neighbors
    }

    /// Conduit length for routable segments, 0 for everything else.
    pub fn edge_weight(&self, id: ElementId) -> f64 {
        if self.source.category(id) != Some(Category::ConduitSegment) {
            return 0.0;
        }
        match self.source.length(id) {
            Some(length) if length.is_finite() && length > 0.0 => length,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connector, Document, ModelElement};

    fn cr(owner: i64, index: usize) -> ConnectorRef {
        ConnectorRef::new(owner, index)
    }

    fn ids(neighbors: &[Neighbor]) -> Vec<i64> {
        neighbors.iter().map(|n| n.element.0).collect()
    }

    #[test]
    fn test_only_connected_routable_connectors() {
        let mut doc = Document::new();
        doc.add_element(
            ModelElement::new(1, Category::Fixture)
                .with_connector(Connector::new(ConnectorKind::End))
                .with_connector(Connector::new(ConnectorKind::Logical))
                .with_connector(Connector::new(ConnectorKind::Curve).disconnected()),
        );
        doc.add_element(ModelElement::segment(2, 1.0, 5));
        doc.add_element(ModelElement::segment(3, 1.0, 5));
        doc.add_element(ModelElement::segment(4, 1.0, 5));
        doc.join(cr(1, 0), cr(2, 0));
        doc.join(cr(1, 1), cr(3, 0));
        doc.join(cr(1, 2), cr(4, 0));

        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);
        assert_eq!(ids(&adapter.active_neighbors(ElementId(1))), vec![2]);
    }

    #[test]
    fn test_nested_parts_resolve_to_parent() {
        let mut doc = Document::new();
        doc.add_element(ModelElement::new(10, Category::Fixture));
        doc.add_element(
            ModelElement::new(11, Category::Other)
                .with_parent(10)
                .with_connectors(1, ConnectorKind::Physical),
        );
        doc.add_element(ModelElement::segment(2, 1.0, 5));
        doc.join(cr(11, 0), cr(2, 0));

        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);
        assert_eq!(adapter.owner(ElementId(11)), ElementId(10));
        assert_eq!(ids(&adapter.active_neighbors(ElementId(2))), vec![10]);
        assert_eq!(ids(&adapter.active_neighbors(ElementId(10))), vec![2]);
        assert_eq!(ids(&adapter.active_neighbors(ElementId(11))), vec![2]);
    }

    #[test]
    fn test_vanished_element_has_no_neighbors() {
        let mut doc = Document::new();
        doc.add_element(ModelElement::segment(1, 1.0, 5));
        doc.add_element(ModelElement::segment(2, 1.0, 5));
        doc.join(cr(1, 1), cr(2, 0));
        doc.remove_element(ElementId(2));

        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);
        assert!(adapter.active_neighbors(ElementId(1)).is_empty());
        assert!(adapter.active_neighbors(ElementId(2)).is_empty());
    }

    #[test]
    fn test_orphaned_part_stands_alone() {
        let mut doc = Document::new();
        doc.add_element(ModelElement::new(10, Category::Fixture));
        doc.add_element(
            ModelElement::new(11, Category::Other)
                .with_parent(10)
                .with_connectors(1, ConnectorKind::Physical),
        );
        doc.add_element(ModelElement::segment(2, 1.0, 5));
        doc.add_element(
            ModelElement::new(100, Category::Equipment).with_connectors(1, ConnectorKind::End),
        );
        doc.join(cr(11, 0), cr(2, 0));
        doc.join(cr(2, 1), cr(100, 0));
        doc.remove_element(ElementId(10));

        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);
        assert_eq!(adapter.owner(ElementId(11)), ElementId(11));
        assert_eq!(ids(&adapter.active_neighbors(ElementId(2))), vec![11, 100]);
        assert!(adapter.active_neighbors(ElementId(10)).is_empty());
    }

    #[test]
    fn test_edge_weight() {
        let mut doc = Document::new();
        doc.add_element(ModelElement::segment(1, 2.5, 5));
        doc.add_element(ModelElement::new(2, Category::Fixture).with_length(9.0));
        doc.add_element(ModelElement::segment(3, -1.0, 5));

        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);
        assert_eq!(adapter.edge_weight(ElementId(1)), 2.5);
        assert_eq!(adapter.edge_weight(ElementId(2)), 0.0);
        assert_eq!(adapter.edge_weight(ElementId(3)), 0.0);
        assert_eq!(adapter.edge_weight(ElementId(99)), 0.0);
    }
}
