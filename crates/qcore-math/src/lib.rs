// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Fixed-Point Arithmetic Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]
//! Signed Q16.16 fixed-point arithmetic shared by every stage of the
//! collapse control loop.
//!
//! The control path never touches floating point: all conversions are
//! exact 16-bit shifts, products go through a 64-bit intermediate, and
//! both multiply and divide saturate instead of wrapping.
//!
//! # Invariants
//!
//! 1. **Division by zero saturates** to [`Fixed::MAX`]. It never traps
//!    and is indistinguishable from a genuine overflow to `+MAX`.
//!
//! 2. **`cos` is even and exact at zero**: range reduction is symmetric,
//!    so `cos(x) == cos(-x)` bit-for-bit and `cos(0) == Fixed::ONE`.
//!
//! 3. **The golden operator is bounded**: `|O_n| <= 1` for every `n`.

pub mod fixed;
pub mod lagrangian;
pub mod trig;

pub use fixed::Fixed;
pub use lagrangian::{compute_lagrangian, LagrangianState};
pub use trig::{cos, golden_operator, parity, reduce_angle};
