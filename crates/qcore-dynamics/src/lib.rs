// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Loop Dynamics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Statistical and oscillatory stages of the collapse control loop:
//! phase scheduler, drift corrector, Bayesian attractor and the
//! decoherence filter that gates its learning.
//!
//! Everything here is fixed-point, allocation-free after construction,
//! and never fails: degeneracy is absorbed (determinant floor, variance
//! floor, saturating arithmetic) rather than reported.

pub mod attractor;
pub mod decoherence;
pub mod phase;
pub mod scheduler;

pub use attractor::{floor_determinant, invert_symmetric, BayesianAttractor, Mat2, Vec2};
pub use decoherence::{axis_angle, DecoherenceFilter};
pub use phase::PhaseState;
pub use scheduler::{classify, PhaseScheduler};
