// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Collapse Byte
// ─────────────────────────────────────────────────────────────────────
//! Wire format of one protocol exchange:
//!
//! ```text
//!   bit 7      bits 0-6
//!   ┌───┬─────────────────┐
//!   │ c │ phase (0..=127) │
//!   └───┴─────────────────┘
//! ```
//!
//! `c` is the discrete collapse outcome, the low seven bits are the
//! continuous phase trajectory.

use serde::{Deserialize, Serialize};

use qcore_math::Fixed;

pub const PHASE_MASK: u8 = 0x7F;
pub const COLLAPSE_BIT: u8 = 0x80;

/// The live byte exchanged with the oracle every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapseByte(u8);

impl CollapseByte {
    #[inline]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn from_parts(phase: u8, collapsed_bit: u8) -> Self {
        Self((phase & PHASE_MASK) | ((collapsed_bit & 1) << 7))
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Phase trajectory, always in 0..=127.
    #[inline]
    pub const fn phase(self) -> u8 {
        self.0 & PHASE_MASK
    }

    /// Collapse outcome, always 0 or 1.
    #[inline]
    pub const fn collapsed_bit(self) -> u8 {
        self.0 >> 7
    }

    /// Overwrite the phase bits, keeping the collapse bit.
    #[inline]
    pub fn set_phase(&mut self, phase: u8) {
        self.0 = (self.0 & COLLAPSE_BIT) | (phase & PHASE_MASK);
    }

    /// Overwrite the collapse bit, keeping the phase bits.
    #[inline]
    pub fn set_collapsed_bit(&mut self, bit: u8) {
        self.0 = (self.0 & PHASE_MASK) | ((bit & 1) << 7);
    }

    pub const fn observation(self) -> CycleObservation {
        CycleObservation {
            requested_phase: self.phase(),
            collapsed_bit: self.collapsed_bit(),
        }
    }
}

impl From<u8> for CollapseByte {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

/// Result of one protocol exchange, consumed immediately by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleObservation {
    /// Phase read back from the oracle (0..=127).
    pub requested_phase: u8,
    /// Collapse outcome (0 or 1).
    pub collapsed_bit: u8,
}

impl CycleObservation {
    /// (phase, outcome) lifted into fixed point for the attractor.
    pub fn to_fixed(self) -> (Fixed, Fixed) {
        (
            Fixed::from_int(self.requested_phase as i32),
            Fixed::from_int(self.collapsed_bit as i32),
        )
    }
}
