// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Range-Reduced Cosine + Golden Operator
// ─────────────────────────────────────────────────────────────────────
//! Fixed-point cosine and the golden operator
//!
//!   O_n = cos(πn) · cos(πφn)
//!
//! where cos(πn) is evaluated exactly as the integer parity of `n`.
//! O_n is the oscillation primitive shared by the phase scheduler and
//! the decoherence filter.

use crate::fixed::Fixed;

/// Reduce `angle` into [−π, π] by repeated subtraction/addition of 2π.
pub fn reduce_angle(angle: Fixed) -> Fixed {
    let mut a = angle;
    while a > Fixed::PI {
        a -= Fixed::TWO_PI;
    }
    while a < -Fixed::PI {
        a += Fixed::TWO_PI;
    }
    a
}

/// Fourth-order Maclaurin cosine `1 − x²/2 + x⁴/24` after range reduction.
///
/// Over [−π, π] the polynomial stays within [−0.5, 1.0].
pub fn cos(angle: Fixed) -> Fixed {
    let x = reduce_angle(angle);
    let x2 = x.mul(x);
    let term2 = x2.mul(Fixed::HALF);
    let x4 = x2.mul(x2);
    let term4 = x4.mul(Fixed::INV_24);
    Fixed::ONE - term2 + term4
}

/// cos(πn) for integer `n`: +1 when even, −1 when odd.
#[inline]
pub fn parity(n: i64) -> Fixed {
    if n % 2 == 0 {
        Fixed::ONE
    } else {
        Fixed::NEG_ONE
    }
}

/// Golden operator O_n = parity(n) · cos(π·φ·n).
///
/// The geometric phase is only meaningful for |n| up to ~20 000. Between
/// that and 32 767 the φ·n product saturates; beyond 32 767
/// [`Fixed::from_int`] wraps, so the phase wraps with it.
pub fn golden_operator(n: i32) -> Fixed {
    let phi_n = Fixed::PHI.mul(Fixed::from_int(n));
    let phase = Fixed::PI.mul(phi_n);
    parity(n as i64).mul(cos(phase))
}
