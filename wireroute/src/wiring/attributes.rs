//! Electrical attributes written into a wiring slot.

use serde::Serialize;

use crate::model::{Circuit, SlotData};

/// Phase/neutral conductor cross-section (mm²) for an apparent current in amperes.
pub fn phase_gauge(current: f64) -> f64 {
    match current {
        c if c <= 15.0 => 1.5,
        c if c <= 20.0 => 2.5,
        c if c <= 30.0 => 4.0,
        c if c <= 40.0 => 6.0,
        _ => 10.0,
    }
}

/// Ground conductor cross-section (mm²) for an apparent current in amperes.
pub fn ground_gauge(current: f64) -> f64 {
    match current {
        c if c <= 20.0 => 2.5,
        c if c <= 40.0 => 4.0,
        _ => 6.0,
    }
}

/// Conductor counts and gauges of one circuit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WiringAttributes {
    pub phase: u32,
    pub neutral: u32,
    pub ground: u32,
    pub returns: u32,
    pub phase_gauge: f64,
    pub ground_gauge: f64,
}

impl WiringAttributes {
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let wiring = &circuit.wiring;
        Self {
            phase: wiring.phase,
            neutral: wiring.neutral,
            ground: wiring.ground,
            returns: 0,
            phase_gauge: phase_gauge(wiring.apparent_current),
            ground_gauge: ground_gauge(wiring.apparent_current),
        }
    }

    pub fn with_returns(mut self, returns: u32) -> Self {
        self.returns = returns;
        self
    }

    /// Slot contents for `circuit` carrying these attributes
    pub fn to_slot(&self, circuit: &str) -> SlotData {
        SlotData {
            circuit: circuit.to_string(),
            phase: self.phase,
            neutral: self.neutral,
            ground: self.ground,
            returns: self.returns,
            phase_gauge: self.phase_gauge,
            ground_gauge: self.ground_gauge,
        }
    }
}
