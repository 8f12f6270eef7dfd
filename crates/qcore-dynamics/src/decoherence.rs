// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Decoherence (Lindblad) Filter
// ─────────────────────────────────────────────────────────────────────
//! Gate deciding whether an observation is trustworthy enough to learn.
//!
//! Two decoherence channels are modelled: the laminar channel L_φ at
//! rate Γ_φ = 1 and the polarity channel L_π at Γ_π = φ²·Γ_φ. Their ratio
//! is fixed at φ² ≈ 2.618.
//!
//! Each update:
//!
//! 1. `axis = parity(n) · cos(θ_n)` with θ_n = ((n·1618/1000) mod 360)°,
//!    a data-independent oscillation in [−1, 1].
//! 2. `visibility = 1 − clamp(surprise / max_surprise, 0, 1)`.
//! 3. A collapse bit of 1 (particle, localized) subtracts the penalty,
//!    a 0 (wave, extended) adds the bonus; the result is clamped to [0, 1].
//!
//! Learning is withheld ("laundered") while visibility is strictly below
//! the launder threshold.

use serde::{Deserialize, Serialize};

use qcore_math::{cos, parity, Fixed};
use qcore_types::QcoreConfig;

/// Oscillation angle for cycle `n`, in radians within [0, 2π).
pub fn axis_angle(n: u32) -> Fixed {
    let phi_phase = (n as u64 * 1618 / 1000) % 360;
    let degrees = Fixed::from_int(phi_phase as i32);
    degrees.mul(Fixed::PI).div_int(180)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoherenceFilter {
    axis: Fixed,
    visibility: Fixed,
    cycle_count: u32,
    gamma_phi: Fixed,
    gamma_pi: Fixed,
    max_surprise: Fixed,
    launder_threshold: Fixed,
    particle_penalty: Fixed,
    wave_bonus: Fixed,
}

impl DecoherenceFilter {
    /// Bosonic and fully visible.
    pub fn new(config: &QcoreConfig) -> Self {
        Self {
            axis: Fixed::ONE,
            visibility: Fixed::ONE,
            cycle_count: 0,
            gamma_phi: Fixed::ONE,
            gamma_pi: Fixed::PHI_SQUARED,
            max_surprise: config.max_surprise,
            launder_threshold: config.launder_threshold,
            particle_penalty: config.particle_penalty,
            wave_bonus: config.wave_bonus,
        }
    }

    pub fn update(&mut self, surprise: Fixed, collapsed_bit: u8) {
        self.cycle_count = self.cycle_count.wrapping_add(1);
        let n = self.cycle_count;

        self.axis = parity(n as i64)
            .mul(cos(axis_angle(n)))
            .clamp(Fixed::NEG_ONE, Fixed::ONE);

        let normalized = surprise
            .clamp(Fixed::ZERO, self.max_surprise)
            .div(self.max_surprise)
            .clamp(Fixed::ZERO, Fixed::ONE);
        let base = Fixed::ONE - normalized;
        let biased = if collapsed_bit & 1 == 1 {
            base - self.particle_penalty
        } else {
            base + self.wave_bonus
        };
        self.visibility = biased.clamp(Fixed::ZERO, Fixed::ONE);
    }

    pub fn should_launder(&self) -> bool {
        self.visibility < self.launder_threshold
    }

    pub fn visibility(&self) -> Fixed {
        self.visibility
    }

    /// Boson/fermion axis: +1 bosonic, −1 fermionic.
    pub fn axis(&self) -> Fixed {
        self.axis
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn gamma_phi(&self) -> Fixed {
        self.gamma_phi
    }

    pub fn gamma_pi(&self) -> Fixed {
        self.gamma_pi
    }

    /// Γ_π / Γ_φ.
    pub fn gamma_ratio(&self) -> Fixed {
        self.gamma_pi.div(self.gamma_phi)
    }
}

impl Default for DecoherenceFilter {
    fn default() -> Self {
        Self::new(&QcoreConfig::default())
    }
}
