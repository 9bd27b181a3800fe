//! Host Interface Module
//!
//! The engine never owns the host document. It reads connectivity through
//! [`GraphSource`], writes wiring slots through [`SlotWriter`] and lets the
//! host scope a batch of writes with [`Transactional`]. The reference
//! [`Document`](super::Document) implements all three.

use thiserror::Error;

use super::schema::{
    Category, Circuit, ConnectorRef, ConnectorView, ElementId, SlotData,
};

/// Errors raised by a host while writing slot data
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WriteError {
    #[error("Element {0} no longer exists in the document")]
    StaleElement(ElementId),

    #[error("Segment {segment} has no wiring slot #{index}")]
    MissingSlot { segment: ElementId, index: usize },
}

/// Read-only view of the host connectivity model.
///
/// Every query is side-effect free. An id that no longer resolves answers
/// `None` or an empty collection rather than failing.
pub trait GraphSource {
    /// All element ids, in document order
    fn element_ids(&self) -> Vec<ElementId>;

    fn contains(&self, id: ElementId) -> bool {
        self.category(id).is_some()
    }

    fn category(&self, id: ElementId) -> Option<Category>;

    fn connectors(&self, id: ElementId) -> Vec<ConnectorView>;

    /// Connectors joined to `connector`; empty when dangling
    fn peers(&self, connector: ConnectorRef) -> Vec<ConnectorRef>;

    /// Enclosing assembly of a nested sub-part
    fn super_component(&self, id: ElementId) -> Option<ElementId>;

    /// Sub-parts directly nested in `id`
    fn sub_components(&self, id: ElementId) -> Vec<ElementId> {
        self.element_ids()
            .into_iter()
            .filter(|&e| e != id && self.super_component(e) == Some(id))
            .collect()
    }

    /// Length attribute of a routable segment
    fn length(&self, id: ElementId) -> Option<f64>;

    fn circuit_tag(&self, id: ElementId) -> Option<String>;

    fn switch_tag(&self, id: ElementId) -> Option<String>;

    fn circuits(&self) -> Vec<Circuit>;

    fn circuit(&self, name: &str) -> Option<Circuit> {
        self.circuits().into_iter().find(|c| c.name == name)
    }
}

/// Write access to the wiring slots of conduit segments.
///
/// Slot indices are 1-based, matching the slot names hosts display.
pub trait SlotWriter {
    /// Current data of slot `index`, or `None` when the segment does not
    /// expose that slot (or no longer exists)
    fn slot(&self, segment: ElementId, index: usize) -> Option<SlotData>;

    fn write_slot(
        &mut self,
        segment: ElementId,
        index: usize,
        data: SlotData,
    ) -> Result<(), WriteError>;

    /// Every segment that carries slots
    fn segment_ids(&self) -> Vec<ElementId>;
}

/// All-or-nothing scope for a batch of host writes
pub trait Transactional {
    /// Run `f`; when it returns `Err` every write made inside is undone.
    fn transaction<T, E, F>(&mut self, label: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>;
}
