// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Metriplectic Lagrangian Split
// ─────────────────────────────────────────────────────────────────────
//! Split of a (u, v) state into a conservative (symplectic) and a
//! dissipative (metric) component:
//!
//!   L_symp = ½v² + ½u²   (harmonic-oscillator energy H)
//!   L_metr = −½v²        (frictional entropy production)

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed;

/// Symplectic and metric components of the Lagrangian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagrangianState {
    /// Conservative part (≥ 0).
    pub l_symp: Fixed,
    /// Dissipative part (≤ 0).
    pub l_metr: Fixed,
}

pub fn compute_lagrangian(u: Fixed, v: Fixed) -> LagrangianState {
    let v2 = v.mul(v);
    let u2 = u.mul(u);
    LagrangianState {
        l_symp: Fixed::HALF.mul(v2) + Fixed::HALF.mul(u2),
        l_metr: -Fixed::HALF.mul(v2),
    }
}
