//! Host Model Data Types
//!
//! This module defines the data structures the engine reads from the host
//! document: elements, connectors, circuits and the per-segment wiring slots.
//! They are designed to be:
//! - Host-agnostic: any CAD document can be projected onto them
//! - Strictly typed: closed enums instead of category-name strings
//! - Serializable: the reference document round-trips through JSON

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of a host element.
///
/// Serializes as a bare integer so persisted route sets stay
/// `{"circuit": [id, ...]}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ElementId {
    fn from(value: i64) -> Self {
        ElementId(value)
    }
}

/// Device class of an element, resolved once by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Luminaires, outlets and other end devices fed by a circuit
    Fixture,
    /// Switches and other lighting control devices
    LightingDevice,
    /// Conduit runs; the only elements that carry length and wiring slots
    ConduitSegment,
    /// Panels and boards acting as a circuit source
    Equipment,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Fixture => write!(f, "Fixture"),
            Category::LightingDevice => write!(f, "Lighting Device"),
            Category::ConduitSegment => write!(f, "Conduit Segment"),
            Category::Equipment => write!(f, "Equipment"),
            Category::Other => write!(f, "Other"),
        }
    }
}

/// Physical kind of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    End,
    Curve,
    Physical,
    Logical,
    Reference,
}

impl ConnectorKind {
    /// Kinds that join physical conduit runs.
    pub const ROUTABLE: [ConnectorKind; 3] =
        [ConnectorKind::End, ConnectorKind::Curve, ConnectorKind::Physical];
}

impl Default for ConnectorKind {
    fn default() -> Self {
        ConnectorKind::End
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorState {
    Connected,
    NotConnected,
}

impl Default for ConnectorState {
    fn default() -> Self {
        ConnectorState::Connected
    }
}

/// Address of one connector: its owning element plus its position on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectorRef {
    pub owner: ElementId,
    pub index: usize,
}

impl ConnectorRef {
    pub fn new(owner: impl Into<ElementId>, index: usize) -> Self {
        Self {
            owner: owner.into(),
            index,
        }
    }
}

/// A joinable point on an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(default)]
    pub kind: ConnectorKind,

    #[serde(default)]
    pub state: ConnectorState,
}

impl Connector {
    pub fn new(kind: ConnectorKind) -> Self {
        Self {
            kind,
            state: ConnectorState::Connected,
        }
    }

    pub fn disconnected(mut self) -> Self {
        self.state = ConnectorState::NotConnected;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectorState::Connected
    }
}

/// A connector as seen through the graph source, with its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorView {
    pub reference: ConnectorRef,
    pub kind: ConnectorKind,
    pub state: ConnectorState,
}

impl ConnectorView {
    /// Connected and of one of the `routable` kinds
    pub fn is_active(&self, routable: &[ConnectorKind]) -> bool {
        self.state == ConnectorState::Connected && routable.contains(&self.kind)
    }
}

/// One named group of wiring attributes on a conduit segment.
///
/// A slot is occupied as soon as its circuit name is non-empty; the numeric
/// sub-attributes only count as set when non-zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotData {
    #[serde(default)]
    pub circuit: String,

    #[serde(default)]
    pub phase: u32,

    #[serde(default)]
    pub neutral: u32,

    #[serde(default)]
    pub ground: u32,

    #[serde(default)]
    pub returns: u32,

    /// Phase/neutral conductor cross-section in mm²
    #[serde(default)]
    pub phase_gauge: f64,

    /// Ground conductor cross-section in mm²
    #[serde(default)]
    pub ground_gauge: f64,
}

impl SlotData {
    pub fn is_occupied(&self) -> bool {
        !self.circuit.is_empty()
    }

    pub fn holds(&self, circuit: &str) -> bool {
        self.is_occupied() && self.circuit == circuit
    }

    /// True when every sub-attribute is in its unset state.
    pub fn is_blank(&self) -> bool {
        self.circuit.is_empty()
            && self.phase == 0
            && self.neutral == 0
            && self.ground == 0
            && self.returns == 0
            && self.phase_gauge == 0.0
            && self.ground_gauge == 0.0
    }
}

/// A host element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelElement {
    pub id: ElementId,

    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub connectors: Vec<Connector>,

    /// Enclosing assembly when this element is a nested sub-part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,

    /// Circuit identifier attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<String>,

    /// Switch-id tag shared by a light group and its switches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_id: Option<String>,

    /// Run length; only meaningful for conduit segments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Wiring slots, index 0 holds slot #1
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotData>,
}

impl ModelElement {
    pub fn new(id: impl Into<ElementId>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            connectors: Vec::new(),
            parent: None,
            circuit: None,
            switch_id: None,
            length: None,
            slots: Vec::new(),
        }
    }

    /// A conduit run with two end connectors and `slot_count` blank slots.
    pub fn segment(id: impl Into<ElementId>, length: f64, slot_count: usize) -> Self {
        let mut element = Self::new(id, Category::ConduitSegment)
            .with_connectors(2, ConnectorKind::End)
            .with_length(length);
        element.slots = vec![SlotData::default(); slot_count];
        element
    }

    pub fn with_connectors(mut self, count: usize, kind: ConnectorKind) -> Self {
        self.connectors
            .extend(std::iter::repeat_with(|| Connector::new(kind)).take(count));
        self
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ElementId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_circuit(mut self, circuit: impl Into<String>) -> Self {
        self.circuit = Some(circuit.into());
        self
    }

    pub fn with_switch_id(mut self, switch_id: impl Into<String>) -> Self {
        self.switch_id = Some(switch_id.into());
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn is_segment(&self) -> bool {
        self.category == Category::ConduitSegment
    }
}

/// Electrical system type of a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitKind {
    Power,
    Other,
}

impl Default for CircuitKind {
    fn default() -> Self {
        CircuitKind::Power
    }
}

/// Conductor data attached to a circuit by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitWiring {
    /// Apparent current in amperes
    #[serde(default)]
    pub apparent_current: f64,

    #[serde(default)]
    pub phase: u32,

    #[serde(default)]
    pub neutral: u32,

    #[serde(default)]
    pub ground: u32,
}

/// A logical circuit: a source plus the devices it feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    pub name: String,

    #[serde(default)]
    pub kind: CircuitKind,

    /// The panel the circuit is fed from; every route ends here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_equipment: Option<ElementId>,

    #[serde(default)]
    pub members: Vec<ElementId>,

    #[serde(default)]
    pub wiring: CircuitWiring,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CircuitKind::Power,
            base_equipment: None,
            members: Vec::new(),
            wiring: CircuitWiring::default(),
        }
    }

    pub fn with_base(mut self, base: impl Into<ElementId>) -> Self {
        self.base_equipment = Some(base.into());
        self
    }

    pub fn with_members<I, T>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        self.members.extend(members.into_iter().map(Into::into));
        self
    }

    pub fn with_kind(mut self, kind: CircuitKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_wiring(mut self, wiring: CircuitWiring) -> Self {
        self.wiring = wiring;
        self
    }
}

/// A join between two connectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorJoin {
    pub a: ConnectorRef,
    pub b: ConnectorRef,
}

impl ConnectorJoin {
    /// The far side of the join as seen from `connector`.
    pub fn peer_of(&self, connector: ConnectorRef) -> Option<ConnectorRef> {
        if self.a == connector {
            Some(self.b)
        } else if self.b == connector {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Metadata about the document source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub project_name: String,

    /// Timestamp of when this was exported
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    #[serde(default = "default_schema_version")]
    pub schema_version: String,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            project_name: "Untitled".to_string(),
            timestamp: Utc::now(),
            source_file: None,
            schema_version: default_schema_version(),
        }
    }
}

/// Serialized form of a whole host document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSchema {
    #[serde(default)]
    pub metadata: DocumentMetadata,

    #[serde(default)]
    pub elements: Vec<ModelElement>,

    #[serde(default)]
    pub joins: Vec<ConnectorJoin>,

    #[serde(default)]
    pub circuits: Vec<Circuit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_occupancy() {
        let mut slot = SlotData::default();
        assert!(!slot.is_occupied());
        assert!(slot.is_blank());

        slot.returns = 2;
        assert!(!slot.is_occupied(), "numeric data alone does not occupy a slot");
        assert!(!slot.is_blank());

        slot.circuit = "L1".to_string();
        assert!(slot.holds("L1"));
        assert!(!slot.holds("L2"));
    }

    #[test]
    fn test_join_peer_of() {
        let join = ConnectorJoin {
            a: ConnectorRef::new(1, 0),
            b: ConnectorRef::new(2, 1),
        };
        assert_eq!(join.peer_of(ConnectorRef::new(1, 0)), Some(ConnectorRef::new(2, 1)));
        assert_eq!(join.peer_of(ConnectorRef::new(2, 1)), Some(ConnectorRef::new(1, 0)));
        assert_eq!(join.peer_of(ConnectorRef::new(3, 0)), None);
    }

    #[test]
    fn test_element_json_shape() {
        let json = r#"{
            "id": 7,
            "category": "conduit_segment",
            "connectors": [{"kind": "end"}, {"kind": "curve", "state": "not_connected"}],
            "length": 3.5,
            "slots": [{}, {"circuit": "C2", "phase": 1}]
        }"#;
        let element: ModelElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.id, ElementId(7));
        assert!(element.is_segment());
        assert!(element.connectors[0].is_connected());
        assert!(!element.connectors[1].is_connected());
        assert!(element.slots[1].holds("C2"));
    }
}
