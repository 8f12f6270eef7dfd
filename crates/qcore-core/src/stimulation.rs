// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Stimulation Sink Interface
// ─────────────────────────────────────────────────────────────────────
//! Hand-off point for the energy the loop releases.
//!
//! The loop never models what the sink does with it. A dissipative cycle
//! hands over its surprise as residue; every cycle hands over the pump
//! rate of its metriplectic regime.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use qcore_math::Fixed;

/// Consumer of the loop's released energy.
pub trait StimulationSink {
    /// Residue of one dissipative cycle.
    fn stimulate(&mut self, residue: Fixed);

    /// Pump rate of the current cycle (zero in the fermionic regime).
    fn pump_energy(&mut self, _rate: Fixed) {}
}

impl<S: StimulationSink + ?Sized> StimulationSink for &mut S {
    fn stimulate(&mut self, residue: Fixed) {
        (**self).stimulate(residue)
    }

    fn pump_energy(&mut self, rate: Fixed) {
        (**self).pump_energy(rate)
    }
}

impl<S: StimulationSink + ?Sized> StimulationSink for Box<S> {
    fn stimulate(&mut self, residue: Fixed) {
        (**self).stimulate(residue)
    }

    fn pump_energy(&mut self, rate: Fixed) {
        (**self).pump_energy(rate)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StimulationSink for NullSink {
    fn stimulate(&mut self, _residue: Fixed) {}
}

/// What a [`RecordingSink`] has received so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkLog {
    pub residues: Vec<Fixed>,
    pub pump_cycles: u64,
    pub bosonic_cycles: u64,
    pub total_pumped: Fixed,
}

/// Host-side sink that records every hand-off.
///
/// Clones share one log behind a `parking_lot::Mutex`, so a handle kept
/// outside the loop observes what the loop delivered.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SinkLog {
        self.log.lock().clone()
    }

    pub fn residues(&self) -> Vec<Fixed> {
        self.log.lock().residues.clone()
    }

    pub fn clear(&self) {
        *self.log.lock() = SinkLog::default();
    }
}

impl StimulationSink for RecordingSink {
    fn stimulate(&mut self, residue: Fixed) {
        self.log.lock().residues.push(residue);
    }

    fn pump_energy(&mut self, rate: Fixed) {
        let mut log = self.log.lock();
        log.pump_cycles += 1;
        if rate > Fixed::ZERO {
            log.bosonic_cycles += 1;
        }
        log.total_pumped = log.total_pumped.saturating_add(rate);
    }
}
