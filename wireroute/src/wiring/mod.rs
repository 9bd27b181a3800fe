//! Wiring slot allocation.
//!
//! Every conduit segment exposes a fixed number of slots, each holding at
//! most one circuit. Allocation takes the first empty slot and never
//! overwrites a slot held by another circuit. Running it again for a circuit
//! already on a segment changes nothing.

pub mod attributes;
pub mod report;

use tracing::{debug, warn};

use crate::model::{ElementId, GraphSource, SlotData, SlotWriter, WriteError};
use crate::routing::Route;

pub use attributes::{ground_gauge, phase_gauge, WiringAttributes};
pub use report::{AllocationReport, FillReport, SkippedSegment};

/// First slot in `1..=max_slots` with no circuit name.
pub fn find_available_slot<W: SlotWriter + ?Sized>(
    writer: &W,
    segment: ElementId,
    max_slots: usize,
) -> Option<usize> {
    (1..=max_slots).find(|&index| {
        writer
            .slot(segment, index)
            .map(|slot| !slot.is_occupied())
            .unwrap_or(false)
    })
}

/// Slot in `1..=max_slots` already holding `circuit`.
pub fn find_assigned_slot<W: SlotWriter + ?Sized>(
    writer: &W,
    segment: ElementId,
    circuit: &str,
    max_slots: usize,
) -> Option<usize> {
    (1..=max_slots).find(|&index| {
        writer
            .slot(segment, index)
            .map(|slot| slot.holds(circuit))
            .unwrap_or(false)
    })
}

/// Write `circuit` onto every conduit segment of `route`.
///
/// Segments already carrying the circuit keep their data. Segments without
/// a free slot are reported as skipped.
pub fn allocate_and_write<H>(
    host: &mut H,
    route: &Route,
    circuit: &str,
    attributes: &WiringAttributes,
    max_slots: usize,
) -> Result<AllocationReport, WriteError>
where
    H: GraphSource + SlotWriter + ?Sized,
{
    let mut report = AllocationReport::default();

    for segment in route.segments(&*host) {
        if let Some(index) = find_assigned_slot(&*host, segment, circuit, max_slots) {
            report.already_assigned.push((segment, index));
            continue;
        }
        match find_available_slot(&*host, segment, max_slots) {
            Some(index) => {
                host.write_slot(segment, index, attributes.to_slot(circuit))?;
                report.written.push((segment, index));
            }
            None => {
                warn!("Segment {} has no free slot for circuit {}", segment, circuit);
                report.skipped.push(segment);
            }
        }
    }

    debug!(
        "Circuit {}: {} written, {} already assigned, {} skipped",
        circuit,
        report.written.len(),
        report.already_assigned.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Record `returns` return conductors for `circuit` on every segment of `route`.
///
/// A slot already holding the circuit only gets the count when it has none
/// yet; otherwise a free slot is allocated for it.
pub fn write_returns<H>(
    host: &mut H,
    route: &Route,
    circuit: &str,
    returns: u32,
    max_slots: usize,
) -> Result<AllocationReport, WriteError>
where
    H: GraphSource + SlotWriter + ?Sized,
{
    let mut report = AllocationReport::default();

    for segment in route.segments(&*host) {
        if let Some(index) = find_assigned_slot(&*host, segment, circuit, max_slots) {
            match host.slot(segment, index) {
                Some(mut slot) if slot.returns == 0 => {
                    slot.returns = returns;
                    host.write_slot(segment, index, slot)?;
                    report.written.push((segment, index));
                }
                _ => report.already_assigned.push((segment, index)),
            }
            continue;
        }
        match find_available_slot(&*host, segment, max_slots) {
            Some(index) => {
                let slot = SlotData {
                    circuit: circuit.to_string(),
                    returns,
                    ..SlotData::default()
                };
                host.write_slot(segment, index, slot)?;
                report.written.push((segment, index));
            }
            None => {
                warn!("Segment {} has no free slot for returns of {}", segment, circuit);
                report.skipped.push(segment);
            }
        }
    }

    Ok(report)
}

/// Blank every non-blank slot of every segment. Returns the number cleared.
pub fn clear_slots<W: SlotWriter + ?Sized>(
    writer: &mut W,
    max_slots: usize,
) -> Result<usize, WriteError> {
    let mut cleared = 0;
    for segment in writer.segment_ids() {
        for index in 1..=max_slots {
            let Some(slot) = writer.slot(segment, index) else {
                continue;
            };
            if !slot.is_blank() {
                writer.write_slot(segment, index, SlotData::default())?;
                cleared += 1;
            }
        }
    }
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Document, ModelElement};

    fn occupied(circuit: &str) -> SlotData {
        SlotData {
            circuit: circuit.to_string(),
            phase: 1,
            ..SlotData::default()
        }
    }

    fn doc_with_segments() -> Document {
        let mut doc = Document::new();
        doc.add_element(ModelElement::new(1, Category::Fixture));
        doc.add_element(ModelElement::segment(2, 1.0, 5));
        doc.add_element(ModelElement::segment(3, 1.0, 5));
        doc
    }

    fn attrs() -> WiringAttributes {
        WiringAttributes {
            phase: 1,
            neutral: 1,
            ground: 1,
            returns: 0,
            phase_gauge: 1.5,
            ground_gauge: 2.5,
        }
    }

    #[test]
    fn test_find_available_slot_skips_occupied() {
        let mut doc = doc_with_segments();
        doc.write_slot(ElementId(2), 1, occupied("A")).unwrap();
        doc.write_slot(ElementId(2), 3, occupied("B")).unwrap();

        assert_eq!(find_available_slot(&doc, ElementId(2), 5), Some(2));
        assert_eq!(find_available_slot(&doc, ElementId(2), 1), None);
        assert_eq!(find_assigned_slot(&doc, ElementId(2), "B", 5), Some(3));
        assert_eq!(find_available_slot(&doc, ElementId(99), 5), None);
    }

    #[test]
    fn test_full_segment_is_skipped() {
        let mut doc = doc_with_segments();
        for index in 1..=5 {
            doc.write_slot(ElementId(2), index, occupied(&format!("X{}", index)))
                .unwrap();
        }
        assert_eq!(find_available_slot(&doc, ElementId(2), 5), None);

        let route = Route::from_ids([1, 2, 3]);
        let report = allocate_and_write(&mut doc, &route, "C1", &attrs(), 5).unwrap();
        assert_eq!(report.skipped, vec![ElementId(2)]);
        assert_eq!(report.written, vec![(ElementId(3), 1)]);
        assert!(!report.is_complete());
        for index in 1..=5 {
            assert!(doc.slot(ElementId(2), index).unwrap().holds(&format!("X{}", index)));
        }
    }

    #[test]
    fn test_allocation_is_idempotent() {
        let mut doc = doc_with_segments();
        let route = Route::from_ids([2]);

        let first = allocate_and_write(&mut doc, &route, "C1", &attrs(), 5).unwrap();
        assert_eq!(first.written, vec![(ElementId(2), 1)]);

        let mut changed = attrs();
        changed.phase = 3;
        let second = allocate_and_write(&mut doc, &route, "C1", &changed, 5).unwrap();
        assert!(second.written.is_empty());
        assert_eq!(second.already_assigned, vec![(ElementId(2), 1)]);
        assert_eq!(doc.slot(ElementId(2), 1).unwrap().phase, 1);
        assert!(!doc.slot(ElementId(2), 2).unwrap().is_occupied());
    }

    #[test]
    fn test_write_returns() {
        let mut doc = doc_with_segments();
        allocate_and_write(&mut doc, &Route::from_ids([2]), "L1", &attrs(), 5).unwrap();

        let route = Route::from_ids([2, 3]);
        let report = write_returns(&mut doc, &route, "L1", 2, 5).unwrap();
        assert_eq!(report.written, vec![(ElementId(2), 1), (ElementId(3), 1)]);
        assert_eq!(doc.slot(ElementId(2), 1).unwrap().returns, 2);
        assert_eq!(doc.slot(ElementId(2), 1).unwrap().phase, 1);
        assert_eq!(doc.slot(ElementId(3), 1).unwrap().returns, 2);

        let again = write_returns(&mut doc, &route, "L1", 1, 5).unwrap();
        assert!(again.written.is_empty());
        assert_eq!(doc.slot(ElementId(3), 1).unwrap().returns, 2);
    }

    #[test]
    fn test_clear_slots() {
        let mut doc = doc_with_segments();
        doc.write_slot(ElementId(2), 2, occupied("A")).unwrap();
        doc.write_slot(
            ElementId(3),
            5,
            SlotData {
                returns: 1,
                ..SlotData::default()
            },
        )
        .unwrap();

        assert_eq!(clear_slots(&mut doc, 5).unwrap(), 2);
        assert!(doc.slot(ElementId(2), 2).unwrap().is_blank());
        assert!(doc.slot(ElementId(3), 5).unwrap().is_blank());
        assert_eq!(clear_slots(&mut doc, 5).unwrap(), 0);
    }
}
