// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Virtual Collapse Oracle
// ─────────────────────────────────────────────────────────────────────
//! Register-level model of the collapse oracle.
//!
//! Behaves like the device as seen through its five registers:
//!
//! - MAGIC_SIG reports a configurable signature.
//! - CALIBRATE starts a cool-down; TEMP_OK and READY rise after a
//!   configurable number of STATUS polls (or never).
//! - PREPARE arms a collapse; DATA_READY rises after a configurable
//!   number of STATUS polls, with a fresh outcome in bit 7 of the latch
//!   and the phase bits optionally drifted.
//! - Reading DATA_LATCH consumes DATA_READY. A read with no fresh
//!   collapse samples the free-running sensor (noise).
//! - PERMANENT_SHUTDOWN latches the device dark: every later read
//!   returns zero and every write is dropped.

use crate::registers::{command, status, Register, RegisterFile, QPORT_MAGIC};
use crate::rng::PseudoRng;

#[derive(Debug, Clone)]
pub struct VirtualQpu {
    magic: u32,
    status: u32,
    latch: u32,
    phase_lock: u32,
    last_command: u32,
    cooldown_polls: Option<u32>,
    thermal_polls: u32,
    calibrating: bool,
    collapse_latency: u32,
    pending: Option<u32>,
    phase_drift: u8,
    rng: PseudoRng,
    shutdown: bool,
    collapses: u64,
}

impl VirtualQpu {
    /// A healthy device: correct signature, cools down after 4 polls,
    /// collapses after 2, no phase drift.
    pub fn new(seed: u32) -> Self {
        Self {
            magic: QPORT_MAGIC,
            status: status::READY,
            latch: 0,
            phase_lock: 0x0000_1000,
            last_command: 0,
            cooldown_polls: Some(4),
            thermal_polls: 0,
            calibrating: false,
            collapse_latency: 2,
            pending: None,
            phase_drift: 0,
            rng: PseudoRng::new(seed),
            shutdown: false,
            collapses: 0,
        }
    }

    /// Report a different signature (an absent or foreign device).
    pub fn with_magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    /// STATUS polls after CALIBRATE before TEMP_OK; `None` never cools.
    pub fn with_cooldown(mut self, polls: Option<u32>) -> Self {
        self.cooldown_polls = polls;
        self
    }

    /// STATUS polls after PREPARE before DATA_READY.
    pub fn with_collapse_latency(mut self, polls: u32) -> Self {
        self.collapse_latency = polls;
        self
    }

    /// Added (mod 128) to the phase bits on every collapse.
    pub fn with_phase_drift(mut self, drift: u8) -> Self {
        self.phase_drift = drift & 0x7F;
        self
    }

    /// Initial PHASE_LOCK counter value.
    pub fn with_phase_lock(mut self, phase_lock: u32) -> Self {
        self.phase_lock = phase_lock;
        self
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown
    }

    pub fn collapses(&self) -> u64 {
        self.collapses
    }

    pub fn last_command(&self) -> u32 {
        self.last_command
    }

    fn command(&mut self, cmd: u32) {
        self.last_command = cmd;
        match cmd {
            command::PERMANENT_SHUTDOWN => {
                self.shutdown = true;
                self.status = 0;
                self.pending = None;
            }
            command::RESET => {
                self.status = status::READY;
                self.pending = None;
                self.calibrating = false;
            }
            command::CALIBRATE => {
                self.calibrating = true;
                self.thermal_polls = 0;
            }
            command::PREPARE => {
                self.status &= !status::DATA_READY;
                self.pending = Some(self.collapse_latency);
            }
            command::MEASURE => {
                self.pending = None;
                self.collapse();
            }
            _ => {}
        }
    }

    fn poll_status(&mut self) -> u32 {
        if self.calibrating {
            self.thermal_polls = self.thermal_polls.saturating_add(1);
            if self.cooldown_polls.is_some_and(|n| self.thermal_polls >= n) {
                self.status |= status::TEMP_OK | status::READY;
                self.calibrating = false;
            }
        }
        match self.pending {
            Some(0) => {
                self.pending = None;
                self.collapse();
            }
            Some(n) => self.pending = Some(n - 1),
            None => {}
        }
        self.status
    }

    fn collapse(&mut self) {
        let bit = self.rng.next_bit() as u32;
        let phase = ((self.latch as u8 & 0x7F).wrapping_add(self.phase_drift) & 0x7F) as u32;
        self.latch = (self.latch & !0xFF) | phase | (bit << 7);
        self.status |= status::DATA_READY;
        self.collapses += 1;
    }

    fn read_latch(&mut self) -> u32 {
        if self.status & status::DATA_READY != 0 {
            self.status &= !status::DATA_READY;
        } else if self.pending.is_none() {
            self.latch = self.rng.next_word();
        }
        self.latch
    }
}

impl Default for VirtualQpu {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RegisterFile for VirtualQpu {
    fn read(&mut self, reg: Register) -> u32 {
        if self.shutdown {
            return 0;
        }
        match reg {
            Register::MagicSig => self.magic,
            Register::Control => 0,
            Register::Status => self.poll_status(),
            Register::DataLatch => self.read_latch(),
            Register::PhaseLock => self.phase_lock.wrapping_add(self.collapses as u32),
        }
    }

    fn write(&mut self, reg: Register, value: u32) {
        if self.shutdown {
            return;
        }
        match reg {
            Register::Control => self.command(value),
            Register::DataLatch => self.latch = value,
            Register::MagicSig | Register::Status | Register::PhaseLock => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_until(qpu: &mut VirtualQpu, bit: u32, limit: u32) -> Option<u32> {
        (1..=limit).find(|_| qpu.read(Register::Status) & bit != 0)
    }

    #[test]
    fn test_magic_and_readonly() {
        let mut qpu = VirtualQpu::new(1);
        assert_eq!(qpu.read(Register::MagicSig), QPORT_MAGIC);
        qpu.write(Register::MagicSig, 0);
        assert_eq!(qpu.read(Register::MagicSig), QPORT_MAGIC);
    }

    #[test]
    fn test_cooldown_after_configured_polls() {
        let mut qpu = VirtualQpu::new(1).with_cooldown(Some(5));
        qpu.write(Register::Control, command::CALIBRATE);
        assert_eq!(poll_until(&mut qpu, status::TEMP_OK, 100), Some(5));
    }

    #[test]
    fn test_never_cools() {
        let mut qpu = VirtualQpu::new(1).with_cooldown(None);
        qpu.write(Register::Control, command::CALIBRATE);
        assert_eq!(poll_until(&mut qpu, status::TEMP_OK, 1000), None);
    }

    #[test]
    fn test_prepare_collapses_and_keeps_phase() {
        let mut qpu = VirtualQpu::new(1).with_collapse_latency(3);
        qpu.write(Register::DataLatch, 0x55);
        qpu.write(Register::Control, command::PREPARE);
        assert_eq!(poll_until(&mut qpu, status::DATA_READY, 100), Some(4));
        let latched = qpu.read(Register::DataLatch);
        assert_eq!(latched & 0x7F, 0x55);
        assert!(latched & 0x80 == 0 || latched & 0x80 == 0x80);
        assert_eq!(qpu.read(Register::Status) & status::DATA_READY, 0);
        assert_eq!(qpu.collapses(), 1);
    }

    #[test]
    fn test_phase_drift_wraps() {
        let mut qpu = VirtualQpu::new(1)
            .with_collapse_latency(0)
            .with_phase_drift(5);
        qpu.write(Register::DataLatch, 126);
        qpu.write(Register::Control, command::PREPARE);
        assert!(poll_until(&mut qpu, status::DATA_READY, 2).is_some());
        assert_eq!(qpu.read(Register::DataLatch) & 0x7F, 3);
    }

    #[test]
    fn test_phase_lock_counts_collapses() {
        let mut qpu = VirtualQpu::new(1).with_phase_lock(100);
        qpu.write(Register::Control, command::MEASURE);
        qpu.write(Register::Control, command::MEASURE);
        assert_eq!(qpu.read(Register::PhaseLock), 102);
    }

    #[test]
    fn test_idle_latch_is_noise() {
        let mut qpu = VirtualQpu::new(9);
        let a = qpu.read(Register::DataLatch);
        let b = qpu.read(Register::DataLatch);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shutdown_goes_dark() {
        let mut qpu = VirtualQpu::new(1);
        qpu.write(Register::Control, command::PERMANENT_SHUTDOWN);
        assert!(qpu.is_shut_down());
        assert_eq!(qpu.read(Register::MagicSig), 0);
        qpu.write(Register::Control, command::RESET);
        assert!(qpu.is_shut_down());
        assert_eq!(qpu.last_command(), command::PERMANENT_SHUTDOWN);
    }
}
