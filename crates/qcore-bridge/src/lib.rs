// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Oracle Bridge
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Link between the control loop and the collapse oracle: the register
//! file seam with its MMIO and virtual backends, the relax primitive,
//! the boot console seam, and the handshake / per-cycle sync protocol.
//!
//! # Safety Invariants
//!
//! 1. **The handshake never hangs**: the boot window and the thermal
//!    wait are both bounded; absent or misbehaving hardware lands in
//!    simulation, never in a stall.
//!
//! 2. **Mode is latched**: once the handshake reaches `PhaseLocked` or
//!    `Simulating` the mode is fixed for the life of the bridge.
//!
//! 3. **Every sync yields a full observation**: a 7-bit phase and a
//!    0/1 collapse bit, in either mode.
//!
//! 4. **The hardware collapse wait is unbounded**: a silent oracle after
//!    a successful handshake stalls the loop in the relax primitive.
//!
//! 5. **`unsafe` lives in `mmio` only**.

pub mod console;
pub mod mmio;
pub mod protocol;
pub mod registers;
pub mod relax;
pub mod rng;
pub mod virtual_qpu;

pub use console::{BootConsole, OperatorChoice, ScriptedConsole, SilentConsole};
pub use mmio::MmioRegisters;
pub use protocol::{Bridge, BridgeMode, BridgeState, FallbackReason, HandshakeStage};
pub use registers::{Register, RegisterFile, UnmappedPort, QPORT_BASE_ADDR, QPORT_MAGIC};
pub use relax::{CountingRelax, Relax, SpinRelax};
pub use rng::PseudoRng;
pub use virtual_qpu::VirtualQpu;
