// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Phase Drift Corrector
// ─────────────────────────────────────────────────────────────────────
//! Pentagonal drift correction: the accumulator is rescaled every
//! `interval` cycles, or earlier when its magnitude leaves the threshold.
//! The default factor 0.3584 is half of the seven-cycle residue
//! 7 − 2π ≈ 0.7168 rad.

use serde::{Deserialize, Serialize};

use qcore_math::Fixed;
use qcore_types::QcoreConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    accumulator: Fixed,
    cycle_count: u32,
    total_corrections: u32,
    threshold: Fixed,
    interval: u32,
    damping: Fixed,
}

impl PhaseState {
    /// `interval` is clamped to at least 1.
    pub fn new(threshold: Fixed, interval: u32, damping: Fixed) -> Self {
        Self {
            accumulator: Fixed::ZERO,
            cycle_count: 0,
            total_corrections: 0,
            threshold,
            interval: interval.max(1),
            damping,
        }
    }

    pub fn from_config(config: &QcoreConfig) -> Self {
        Self::new(
            config.phase_threshold,
            config.correction_interval,
            config.correction_damping,
        )
    }

    /// Accumulate `innovation`; returns `true` when a correction fired.
    pub fn update(&mut self, innovation: Fixed) -> bool {
        self.cycle_count = self.cycle_count.wrapping_add(1);
        self.accumulator += innovation;

        if self.cycle_count % self.interval == 0 || self.accumulator.abs() > self.threshold {
            self.accumulator = self.accumulator.mul(self.damping);
            self.total_corrections = self.total_corrections.saturating_add(1);
            return true;
        }
        false
    }

    /// Accumulator magnitude within threshold.
    pub fn is_laminar(&self) -> bool {
        self.accumulator.abs() <= self.threshold
    }

    pub fn accumulator(&self) -> Fixed {
        self.accumulator
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn total_corrections(&self) -> u32 {
        self.total_corrections
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::from_config(&QcoreConfig::default())
    }
}
