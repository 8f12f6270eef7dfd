// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Cycle Trace Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use qcore_math::Fixed;

/// Escalation level of the security monitor.
///
/// `Singularity` is terminal: no transition leaves it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityState {
    /// Normal operation.
    #[default]
    Laminar,
    /// Reversible lockdown: the sensitive buffer is transformed.
    Hibernation,
    /// Irreversible destruct.
    Singularity,
}

impl SecurityState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SecurityState::Singularity)
    }
}

/// Scheduler regime derived from the sign of the golden operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// O_n ≥ 0: conservative phase, energy pumping allowed.
    Bosonic,
    /// O_n < 0: dissipative phase, no pumping.
    Fermionic,
}

/// One fully processed loop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// 1-based cycle index.
    pub cycle: u64,
    /// Phase proposed by the scheduler.
    pub requested_phase: u8,
    /// Phase read back after the collapse.
    pub observed_phase: u8,
    /// Collapse outcome.
    pub collapsed_bit: u8,
    /// Squared Mahalanobis distance before learning.
    pub surprise: Fixed,
    /// Visibility after the filter update.
    pub visibility: Fixed,
    /// Boson/fermion axis after the filter update.
    pub axis: Fixed,
    /// Observation withheld from learning by the filter.
    pub laundered: bool,
    /// Surprise exceeded the dissipation threshold.
    pub dissipative: bool,
    /// The phase corrector fired this cycle.
    pub corrected: bool,
    pub regime: Regime,
    /// Energy handed to the stimulation sink by the scheduler.
    pub pump_rate: Fixed,
    /// Security state after the heartbeat.
    pub security: SecurityState,
}

/// Aggregate view over a run of cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub cycles: u64,
    pub learned: u64,
    pub laundered: u64,
    pub dissipative: u64,
    pub corrections: u64,
    pub hibernation_cycles: u64,
    pub max_surprise: Fixed,
    pub final_state: SecurityState,
}

impl TraceSummary {
    pub fn from_records(records: &[CycleRecord]) -> Self {
        let mut s = TraceSummary::default();
        for r in records {
            s.cycles += 1;
            if r.dissipative {
                s.dissipative += 1;
            } else if r.laundered {
                s.laundered += 1;
            } else {
                s.learned += 1;
            }
            if r.corrected {
                s.corrections += 1;
            }
            if r.security == SecurityState::Hibernation {
                s.hibernation_cycles += 1;
            }
            if r.surprise > s.max_surprise {
                s.max_surprise = r.surprise;
            }
            s.final_state = r.security;
        }
        s
    }
}
