// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Q16.16 Scalar
// ─────────────────────────────────────────────────────────────────────
//! The `Fixed` scalar: a signed 32-bit integer carrying 16 fractional bits.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 16;

/// Signed Q16.16 fixed-point number.
///
/// Serialises as its raw `i32` so configuration and traces are bit-exact.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(i32);

#[inline]
fn saturate(wide: i64) -> i32 {
    wide.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(0x0001_0000);
    pub const HALF: Fixed = Fixed(0x0000_8000);
    pub const NEG_ONE: Fixed = Fixed(-0x0001_0000);
    /// Saturation value, also returned by division by zero.
    pub const MAX: Fixed = Fixed(i32::MAX);
    pub const MIN: Fixed = Fixed(i32::MIN);
    /// π ≈ 3.14159
    pub const PI: Fixed = Fixed(0x0003_243F);
    /// 2π, exactly twice [`Fixed::PI`].
    pub const TWO_PI: Fixed = Fixed(0x0003_243F * 2);
    /// φ ≈ 1.618034
    pub const PHI: Fixed = Fixed(0x0001_9E37);
    /// φ² ≈ 2.618
    pub const PHI_SQUARED: Fixed = Fixed(0x0002_9E3A);
    /// 1/24 ≈ 0.04166, the fourth-order Maclaurin coefficient.
    pub const INV_24: Fixed = Fixed(0x0000_0AAA);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Exact shift left by 16. Integers outside ±32767 wrap, as a
    /// 32-bit shift does.
    #[inline]
    pub const fn from_int(i: i32) -> Self {
        Fixed(i.wrapping_shl(FRAC_BITS))
    }

    /// Arithmetic shift right by 16 (floor toward −∞).
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    /// 64-bit product shifted right by 16, no rounding, saturated to i32.
    #[inline]
    pub const fn mul(self, rhs: Fixed) -> Fixed {
        let wide = (self.0 as i64 * rhs.0 as i64) >> FRAC_BITS;
        if wide > i32::MAX as i64 {
            Fixed::MAX
        } else if wide < i32::MIN as i64 {
            Fixed::MIN
        } else {
            Fixed(wide as i32)
        }
    }

    /// `(a << 16) / b`, saturating. `b == 0` returns [`Fixed::MAX`].
    #[inline]
    pub fn div(self, rhs: Fixed) -> Fixed {
        if rhs.0 == 0 {
            return Fixed::MAX;
        }
        Fixed(saturate(((self.0 as i64) << FRAC_BITS) / rhs.0 as i64))
    }

    #[inline]
    pub const fn abs(self) -> Fixed {
        Fixed(self.0.saturating_abs())
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn clamp(self, lo: Fixed, hi: Fixed) -> Fixed {
        Fixed(self.0.clamp(lo.0, hi.0))
    }

    #[inline]
    pub const fn saturating_add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub const fn saturating_sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }

    /// Integer division of the raw value (e.g. `ONE / 10`).
    #[inline]
    pub const fn div_int(self, d: i32) -> Fixed {
        if d == 0 {
            return Fixed::MAX;
        }
        Fixed(self.0 / d)
    }

    /// Lossy conversion for peripheral code (bindings, reports, tests).
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u32 << FRAC_BITS) as f64
    }

    /// Lossy conversion for peripheral code. Truncates toward zero and
    /// saturates out-of-range inputs; NaN maps to zero.
    #[inline]
    pub fn from_f64(v: f64) -> Fixed {
        Fixed((v * (1u32 << FRAC_BITS) as f64) as i32)
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:#010x} ≈ {:.5})", self.0, self.to_f64())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}
