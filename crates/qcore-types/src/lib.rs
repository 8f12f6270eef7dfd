// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! QCore collapse kernel: the closed control loop that drives the
//! collapse oracle and gates stimulation and lockdown on its output.

pub mod collapse;
pub mod config;
pub mod error;
pub mod trace;

pub use collapse::{CollapseByte, CycleObservation, COLLAPSE_BIT, PHASE_MASK};
pub use config::QcoreConfig;
pub use error::{QcoreError, QcoreResult};
pub use trace::{CycleRecord, Regime, SecurityState, TraceSummary};

pub use qcore_math::Fixed;
