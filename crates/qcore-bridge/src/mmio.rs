// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Memory-Mapped Register Backend
// ─────────────────────────────────────────────────────────────────────
#![allow(unsafe_code)]
//! Volatile access to the physical oracle register block.
//!
//! The only module in the workspace that contains `unsafe`. Every access
//! is a single aligned 32-bit volatile load or store at
//! `base + Register::offset()`.

use core::ptr;

use crate::registers::{Register, RegisterFile, REGISTER_COUNT};

/// Register file backed by a memory-mapped block.
#[derive(Debug)]
pub struct MmioRegisters {
    base: *mut u32,
}

impl MmioRegisters {
    /// Map the block at a physical address, e.g.
    /// [`QPORT_BASE_ADDR`](crate::registers::QPORT_BASE_ADDR).
    ///
    /// # Safety
    ///
    /// `base` must be 4-byte aligned and point at a device (or memory)
    /// region of at least `REGISTER_COUNT` words that stays valid for
    /// volatile reads and writes for the lifetime of the value, with no
    /// other code accessing it concurrently.
    pub unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *mut u32,
        }
    }

    /// Map the block over an existing word array.
    ///
    /// # Safety
    ///
    /// Same contract as [`MmioRegisters::new`]; `block` must outlive the
    /// returned value.
    pub unsafe fn from_ptr(block: *mut u32) -> Self {
        Self { base: block }
    }

    pub fn base_addr(&self) -> usize {
        self.base as usize
    }

    /// Size of the mapped block in bytes.
    pub const fn span() -> usize {
        REGISTER_COUNT * 4
    }
}

impl RegisterFile for MmioRegisters {
    #[inline]
    fn read(&mut self, reg: Register) -> u32 {
        // SAFETY: `new`/`from_ptr` contract; index < REGISTER_COUNT.
        unsafe { ptr::read_volatile(self.base.add(reg.index())) }
    }

    #[inline]
    fn write(&mut self, reg: Register, value: u32) {
        // SAFETY: `new`/`from_ptr` contract; index < REGISTER_COUNT.
        unsafe { ptr::write_volatile(self.base.add(reg.index()), value) }
    }
}
