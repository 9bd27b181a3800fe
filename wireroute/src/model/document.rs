//! Reference Document Implementation
//!
//! An in-memory host document backed by petgraph. Elements are nodes and
//! every connector join is an undirected edge between the two owning
//! elements, carrying both connector addresses. The graph structure enables
//! efficient:
//! - Peer lookup for a single connector
//! - Removal of elements without invalidating other indices
//! - Slot snapshots for transactional writes

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::schema::*;
use super::source::{GraphSource, SlotWriter, Transactional, WriteError};

/// The reference host document
#[derive(Debug, Clone)]
pub struct Document {
    /// The underlying graph structure
    graph: StableUnGraph<ModelElement, ConnectorJoin>,

    /// Index mapping: element id -> node index
    indices: HashMap<ElementId, NodeIndex>,

    /// Document order of element ids
    order: Vec<ElementId>,

    /// Index mapping: assembly id -> nested sub-part ids.
    /// Kept for removed assemblies so a re-added one finds its parts again.
    children: HashMap<ElementId, Vec<ElementId>>,

    circuits: Vec<Circuit>,

    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            indices: HashMap::new(),
            order: Vec::new(),
            children: HashMap::new(),
            circuits: Vec::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Build a document from its serialized schema.
    ///
    /// Joins that reference unknown elements or connectors are dropped.
    pub fn from_schema(schema: DocumentSchema) -> Self {
        let mut document = Self::new();
        document.metadata = schema.metadata;

        // Pass 1: elements
        for element in schema.elements {
            document.add_element(element);
        }

        // Pass 2: joins
        for join in schema.joins {
            if !document.join(join.a, join.b) {
                tracing::warn!(
                    "Dropping join {}#{} <-> {}#{}: unknown connector",
                    join.a.owner,
                    join.a.index,
                    join.b.owner,
                    join.b.index
                );
            }
        }

        document.circuits = schema.circuits;
        document
    }

    /// Convert back to the serialized schema
    pub fn to_schema(&self) -> DocumentSchema {
        let elements = self
            .order
            .iter()
            .filter_map(|id| self.element(*id).cloned())
            .collect();
        let joins = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_weight(e).copied())
            .collect();

        DocumentSchema {
            metadata: self.metadata.clone(),
            elements,
            joins,
            circuits: self.circuits.clone(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let schema: DocumentSchema = serde_json::from_str(json)?;
        Ok(Self::from_schema(schema))
    }

    pub fn from_file(path: &Path) -> Result<Self, crate::WireRouteError> {
        let content = std::fs::read_to_string(path)?;
        let mut document = Self::from_json_str(&content)?;
        if document.metadata.source_file.is_none() {
            document.metadata.source_file = Some(path.display().to_string());
        }
        Ok(document)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_schema())
    }

    pub fn save(&self, path: &Path) -> Result<(), crate::WireRouteError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Add an element; an element with the same id is replaced.
    pub fn add_element(&mut self, element: ModelElement) -> NodeIndex {
        let id = element.id;
        self.remove_element(id);
        if let Some(parent) = element.parent {
            self.children.entry(parent).or_default().push(id);
        }
        let idx = self.graph.add_node(element);
        self.indices.insert(id, idx);
        self.order.push(id);
        idx
    }

    /// Join two connectors. Returns false when either connector does not exist.
    pub fn join(&mut self, a: ConnectorRef, b: ConnectorRef) -> bool {
        if !self.has_connector(a) || !self.has_connector(b) {
            return false;
        }
        let (Some(&ia), Some(&ib)) = (self.indices.get(&a.owner), self.indices.get(&b.owner)) else {
            return false;
        };
        self.graph.add_edge(ia, ib, ConnectorJoin { a, b });
        true
    }

    pub fn add_circuit(&mut self, circuit: Circuit) {
        self.circuits.retain(|c| c.name != circuit.name);
        self.circuits.push(circuit);
    }

    /// Remove an element and all its joins, as a host edit would.
    pub fn remove_element(&mut self, id: ElementId) -> Option<ModelElement> {
        let idx = self.indices.remove(&id)?;
        self.order.retain(|e| *e != id);
        let element = self.graph.remove_node(idx)?;
        if let Some(siblings) = element.parent.and_then(|p| self.children.get_mut(&p)) {
            siblings.retain(|e| *e != id);
        }
        Some(element)
    }

    pub fn element(&self, id: ElementId) -> Option<&ModelElement> {
        self.indices
            .get(&id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut ModelElement> {
        self.indices
            .get(&id)
            .copied()
            .and_then(move |idx| self.graph.node_weight_mut(idx))
    }

    /// Get all elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &ModelElement> {
        self.order.iter().filter_map(|id| self.element(*id))
    }

    fn has_connector(&self, connector: ConnectorRef) -> bool {
        self.element(connector.owner)
            .map(|e| connector.index < e.connectors.len())
            .unwrap_or(false)
    }

    fn slot_snapshot(&self) -> HashMap<ElementId, Vec<SlotData>> {
        self.elements()
            .filter(|e| !e.slots.is_empty())
            .map(|e| (e.id, e.slots.clone()))
            .collect()
    }

    fn restore_slots(&mut self, snapshot: HashMap<ElementId, Vec<SlotData>>) {
        for (id, slots) in snapshot {
            if let Some(element) = self.element_mut(id) {
                element.slots = slots;
            }
        }
    }

    /// Get statistics about the document
    pub fn stats(&self) -> DocumentStats {
        let segments: Vec<&ModelElement> = self.elements().filter(|e| e.is_segment()).collect();
        let occupied_slots = segments
            .iter()
            .flat_map(|e| e.slots.iter())
            .filter(|s| s.is_occupied())
            .count();

        DocumentStats {
            element_count: self.order.len(),
            join_count: self.graph.edge_count(),
            segment_count: segments.len(),
            total_length: segments.iter().filter_map(|e| e.length).sum(),
            circuit_count: self.circuits.len(),
            occupied_slots,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphSource for Document {
    fn element_ids(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    fn category(&self, id: ElementId) -> Option<Category> {
        self.element(id).map(|e| e.category)
    }

    fn connectors(&self, id: ElementId) -> Vec<ConnectorView> {
        let Some(element) = self.element(id) else {
            return Vec::new();
        };

        element
            .connectors
            .iter()
            .enumerate()
            .map(|(index, c)| ConnectorView {
                reference: ConnectorRef { owner: id, index },
                kind: c.kind,
                state: c.state,
            })
            .collect()
    }

    fn peers(&self, connector: ConnectorRef) -> Vec<ConnectorRef> {
        let Some(&idx) = self.indices.get(&connector.owner) else {
            return Vec::new();
        };

        self.graph
            .edges(idx)
            .filter_map(|edge| edge.weight().peer_of(connector))
            .collect()
    }

    fn super_component(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).and_then(|e| e.parent)
    }

    fn sub_components(&self, id: ElementId) -> Vec<ElementId> {
        if !self.indices.contains_key(&id) {
            return Vec::new();
        }
        self.children.get(&id).cloned().unwrap_or_default()
    }

    fn length(&self, id: ElementId) -> Option<f64> {
        self.element(id).and_then(|e| e.length)
    }

    fn circuit_tag(&self, id: ElementId) -> Option<String> {
        self.element(id).and_then(|e| e.circuit.clone())
    }

    fn switch_tag(&self, id: ElementId) -> Option<String> {
        self.element(id).and_then(|e| e.switch_id.clone())
    }

    fn circuits(&self) -> Vec<Circuit> {
        self.circuits.clone()
    }

    fn circuit(&self, name: &str) -> Option<Circuit> {
        self.circuits.iter().find(|c| c.name == name).cloned()
    }
}

impl SlotWriter for Document {
    fn slot(&self, segment: ElementId, index: usize) -> Option<SlotData> {
        if index == 0 {
            return None;
        }
        self.element(segment)
            .and_then(|e| e.slots.get(index - 1))
            .cloned()
    }

    fn write_slot(
        &mut self,
        segment: ElementId,
        index: usize,
        data: SlotData,
    ) -> Result<(), WriteError> {
        let element = self
            .element_mut(segment)
            .ok_or(WriteError::StaleElement(segment))?;
        let slot = index
            .checked_sub(1)
            .and_then(|i| element.slots.get_mut(i))
            .ok_or(WriteError::MissingSlot { segment, index })?;
        *slot = data;
        Ok(())
    }

    fn segment_ids(&self) -> Vec<ElementId> {
        self.elements()
            .filter(|e| e.is_segment() && !e.slots.is_empty())
            .map(|e| e.id)
            .collect()
    }
}

impl Transactional for Document {
    fn transaction<T, E, F>(&mut self, label: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.slot_snapshot();
        tracing::debug!("Transaction '{}' started", label);

        match f(self) {
            Ok(value) => {
                tracing::debug!("Transaction '{}' committed", label);
                Ok(value)
            }
            Err(e) => {
                self.restore_slots(snapshot);
                tracing::warn!("Transaction '{}' rolled back", label);
                Err(e)
            }
        }
    }
}

/// Statistics about a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    pub element_count: usize,
    pub join_count: usize,
    pub segment_count: usize,
    pub total_length: f64,
    pub circuit_count: usize,
    pub occupied_slots: usize,
}
