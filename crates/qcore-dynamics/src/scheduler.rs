// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Metriplectic Phase Scheduler
// ─────────────────────────────────────────────────────────────────────
//! Proposes the phase request for each cycle and classifies the cycle
//! into a metriplectic regime by the sign of the golden operator O_n:
//!
//! - O_n ≥ 0: bosonic (conservative), even phases, energy pumped.
//! - O_n < 0: fermionic (dissipative), odd phases, no pumping.

use serde::{Deserialize, Serialize};

use qcore_math::{golden_operator, Fixed};
use qcore_types::{QcoreConfig, Regime, PHASE_MASK};

/// Regime selected by one value of the golden operator.
#[inline]
pub fn classify(o_n: Fixed) -> Regime {
    if o_n.is_negative() {
        Regime::Fermionic
    } else {
        Regime::Bosonic
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseScheduler {
    tick: u32,
    operator: Fixed,
    regime: Regime,
    pump_rate: Fixed,
    bosonic_pump: Fixed,
}

impl PhaseScheduler {
    pub fn new(bosonic_pump: Fixed) -> Self {
        Self {
            tick: 0,
            operator: Fixed::ONE,
            regime: Regime::Bosonic,
            pump_rate: Fixed::ZERO,
            bosonic_pump,
        }
    }

    pub fn from_config(config: &QcoreConfig) -> Self {
        Self::new(config.pump_rate)
    }

    /// Advance the tick and return the next phase in 0..=127.
    ///
    /// The raw proposal is `tick mod 128`; its low bit is then forced to
    /// 0 in the bosonic regime and to 1 in the fermionic one.
    pub fn next_phase(&mut self) -> u8 {
        self.tick = self.tick.wrapping_add(1);
        self.operator = golden_operator(self.tick as i32);
        self.regime = classify(self.operator);
        self.pump_rate = match self.regime {
            Regime::Bosonic => self.bosonic_pump,
            Regime::Fermionic => Fixed::ZERO,
        };

        let base = (self.tick % 128) as u8;
        let phase = match self.regime {
            Regime::Bosonic => base & !1,
            Regime::Fermionic => base | 1,
        };
        phase & PHASE_MASK
    }

    /// Regime of the current tick.
    pub fn regime(&self) -> Regime {
        self.regime
    }

    /// Energy to pump this cycle: the configured rate when bosonic, zero
    /// when fermionic.
    pub fn pump_rate(&self) -> Fixed {
        self.pump_rate
    }

    /// O_n of the current tick.
    pub fn operator(&self) -> Fixed {
        self.operator
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }
}

impl Default for PhaseScheduler {
    fn default() -> Self {
        Self::from_config(&QcoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_in_range() {
        let mut s = PhaseScheduler::default();
        for _ in 0..1000 {
            assert!(s.next_phase() <= 127);
        }
        assert_eq!(s.tick(), 1000);
    }

    #[test]
    fn test_parity_follows_regime() {
        let mut s = PhaseScheduler::default();
        for _ in 0..500 {
            let phase = s.next_phase();
            match s.regime() {
                Regime::Bosonic => assert_eq!(phase % 2, 0),
                Regime::Fermionic => assert_eq!(phase % 2, 1),
            }
        }
    }

    #[test]
    fn test_first_tick_is_fermionic() {
        let mut s = PhaseScheduler::default();
        assert_eq!(s.next_phase(), 1);
        assert_eq!(s.regime(), Regime::Fermionic);
        assert_eq!(s.pump_rate(), Fixed::ZERO);
    }

    #[test]
    fn test_pump_only_when_bosonic() {
        let pump = Fixed::from_raw(0x3333);
        let mut s = PhaseScheduler::new(pump);
        let mut seen = [false; 2];
        for _ in 0..200 {
            s.next_phase();
            match s.regime() {
                Regime::Bosonic => {
                    assert_eq!(s.pump_rate(), pump);
                    seen[0] = true;
                }
                Regime::Fermionic => {
                    assert_eq!(s.pump_rate(), Fixed::ZERO);
                    seen[1] = true;
                }
            }
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_classify_zero_is_bosonic() {
        assert_eq!(classify(Fixed::ZERO), Regime::Bosonic);
        assert_eq!(classify(Fixed::from_raw(-1)), Regime::Fermionic);
    }

    #[test]
    fn test_phase_wraps_at_128() {
        let mut s = PhaseScheduler::default();
        let phases: Vec<u8> = (0..130).map(|_| s.next_phase()).collect();
        // tick 128 maps to 0 or 1, tick 129 to 0 or 1
        assert!(phases[127] <= 1);
        assert!(phases[128] <= 1);
    }
}
