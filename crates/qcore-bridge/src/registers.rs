// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Oracle Register Map
// ─────────────────────────────────────────────────────────────────────
//! Register block of the collapse oracle and the [`RegisterFile`] seam
//! every backend implements.
//!
//! ```text
//!   0x00  MAGIC_SIG    r    0x51425247 ("QBRG")
//!   0x04  CONTROL      w    command bits
//!   0x08  STATUS       r    status bits
//!   0x0C  DATA_LATCH   rw   collapse byte in the low 8 bits
//!   0x10  PHASE_LOCK   r    free-running phase-lock counter
//! ```

use serde::{Deserialize, Serialize};

/// Signature the oracle exposes at offset 0x00.
pub const QPORT_MAGIC: u32 = 0x5142_5247;

/// Physical base address of the block on the reference board.
pub const QPORT_BASE_ADDR: usize = 0xF800_0000;

/// Number of 32-bit registers in the block.
pub const REGISTER_COUNT: usize = 5;

/// CONTROL register commands.
pub mod command {
    pub const RESET: u32 = 0x01;
    pub const CALIBRATE: u32 = 0x02;
    pub const PREPARE: u32 = 0x04;
    pub const MEASURE: u32 = 0x08;
    /// Latches the oracle off until power cycle.
    pub const PERMANENT_SHUTDOWN: u32 = 0x0F;
}

/// STATUS register bits.
pub mod status {
    pub const READY: u32 = 0x01;
    /// Superconducting temperature reached.
    pub const TEMP_OK: u32 = 0x02;
    /// Collapse complete, DATA_LATCH valid.
    pub const DATA_READY: u32 = 0x04;
    pub const DECOHERENCE_WARN: u32 = 0x08;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Register {
    MagicSig = 0x00,
    Control = 0x04,
    Status = 0x08,
    DataLatch = 0x0C,
    PhaseLock = 0x10,
}

impl Register {
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::MagicSig,
        Register::Control,
        Register::Status,
        Register::DataLatch,
        Register::PhaseLock,
    ];

    /// Byte offset from the block base.
    #[inline]
    pub const fn offset(self) -> usize {
        self as usize
    }

    /// Word index from the block base.
    #[inline]
    pub const fn index(self) -> usize {
        self.offset() / 4
    }
}

/// Explicit read/write access to the oracle register block.
///
/// Reads take `&mut self`: on real hardware a STATUS or DATA_LATCH read
/// has side effects, and simulated backends advance their state on it.
pub trait RegisterFile {
    fn read(&mut self, reg: Register) -> u32;
    fn write(&mut self, reg: Register, value: u32);
}

impl<R: RegisterFile + ?Sized> RegisterFile for &mut R {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

impl<R: RegisterFile + ?Sized> RegisterFile for Box<R> {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

/// A block with nothing behind it: every read returns zero and writes
/// are dropped. The magic check always fails, so a bridge over it always
/// ends up in simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnmappedPort;

impl RegisterFile for UnmappedPort {
    fn read(&mut self, _reg: Register) -> u32 {
        0
    }

    fn write(&mut self, _reg: Register, _value: u32) {}
}
