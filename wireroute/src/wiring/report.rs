use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ElementId;

/// Outcome of writing one circuit onto the segments of its route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllocationReport {
    /// Segments written, with the slot used
    pub written: Vec<(ElementId, usize)>,

    /// Segments whose slot already held the circuit and were left untouched
    pub already_assigned: Vec<(ElementId, usize)>,

    /// Segments with every slot taken by another circuit
    pub skipped: Vec<ElementId>,
}

impl AllocationReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A segment left without wiring because all of its slots were occupied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSegment {
    pub circuit: String,
    pub segment: ElementId,
}

/// Summary of a batch run over many circuits
#[derive(Debug, Clone, Serialize)]
pub struct FillReport {
    pub started_at: DateTime<Utc>,
    pub circuits_written: Vec<String>,
    pub circuits_without_segments: Vec<String>,
    pub segments_without_slot: Vec<SkippedSegment>,
    pub slots_written: usize,
}

impl FillReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            circuits_written: Vec::new(),
            circuits_without_segments: Vec::new(),
            segments_without_slot: Vec::new(),
            slots_written: 0,
        }
    }

    pub fn record(&mut self, circuit: &str, allocation: &AllocationReport) {
        self.slots_written += allocation.written.len();
        self.segments_without_slot
            .extend(allocation.skipped.iter().map(|&segment| SkippedSegment {
                circuit: circuit.to_string(),
                segment,
            }));
        if !allocation.written.is_empty() || !allocation.already_assigned.is_empty() {
            self.circuits_written.push(circuit.to_string());
        }
    }

    pub fn record_empty(&mut self, circuit: &str) {
        self.circuits_without_segments.push(circuit.to_string());
    }

    /// Emit the summary through `tracing`
    pub fn log_summary(&self, label: &str) {
        for skipped in &self.segments_without_slot {
            tracing::warn!(
                "{}: no free slot on segment {} for circuit {}",
                label,
                skipped.segment,
                skipped.circuit
            );
        }
        if !self.circuits_without_segments.is_empty() {
            tracing::info!(
                "{}: circuits without conduit segments: {}",
                label,
                self.circuits_without_segments.join(", ")
            );
        }
        tracing::info!(
            "{}: {} circuits, {} slots written, {} segments skipped",
            label,
            self.circuits_written.len(),
            self.slots_written,
            self.segments_without_slot.len()
        );
    }
}

impl Default for FillReport {
    fn default() -> Self {
        Self::new()
    }
}
