// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Collapse Kernel
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! The closed control loop of the QCore kernel and its security
//! escalation machine.
//!
//! # Safety Invariants
//!
//! 1. **Singularity is terminal**: once the monitor enters it, every
//!    `step()` returns `KernelHalt` and no buffer, register or sink is
//!    touched again. `run_forever()` parks in the relax primitive.
//!
//! 2. **Hibernation is reversible**: the lock key is latched on entry and
//!    re-applied on exit, so the sensitive buffer comes back bit-exact.
//!
//! 3. **The forensic record is write-once**: the first breach seals it.
//!
//! 4. **Single owner, no locks on the hot path**: the loop owns every
//!    stage exclusively. The only lock in the crate sits inside the
//!    host-side `RecordingSink`.
//!
//! 5. **Simulation replays bit-for-bit**: for a fixed seed the cycle
//!    trace is fully reproducible.

pub mod kernel;
pub mod security;
pub mod stimulation;

pub use kernel::ControlLoop;
pub use security::{
    apply_phase_transform, fill_sentinel, phase_key, ForensicLog, ForensicRecord, NoiseSource,
    SecurityMonitor, BREACH_MAGIC, FORENSIC_WORDS, PHASE_SALT, PURGE_PACE_HINTS, SENTINEL_BASE,
};
pub use stimulation::{NullSink, RecordingSink, SinkLog, StimulationSink};
