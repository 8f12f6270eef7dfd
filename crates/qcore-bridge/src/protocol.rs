// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Bridge Protocol
// ─────────────────────────────────────────────────────────────────────
//! Boot handshake with the collapse oracle and per-cycle synchronization.
//!
//! ```text
//!   AwaitingOperatorChoice ──s / timeout──────────────────▶ Simulating
//!          │ h
//!          ▼
//!       Probing ──magic mismatch──────────────────────────▶ Simulating
//!          │
//!          ▼
//!     Calibrating ──thermal timeout───────────────────────▶ Simulating
//!          │ TEMP_OK
//!          ▼
//!     PhaseLocked
//! ```
//!
//! Once a terminal stage is reached the mode never changes again.

use serde::{Deserialize, Serialize};

use qcore_types::{CollapseByte, CycleObservation, QcoreConfig};

use crate::console::{BootConsole, OperatorChoice};
use crate::registers::{command, status, Register, RegisterFile, QPORT_MAGIC};
use crate::relax::Relax;
use crate::rng::PseudoRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeMode {
    /// Collapses come from the local pseudo-random source.
    Simulation,
    /// Collapses come from the oracle registers.
    Hardware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandshakeStage {
    AwaitingOperatorChoice,
    Probing,
    Calibrating,
    PhaseLocked,
    Simulating,
}

impl HandshakeStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, HandshakeStage::PhaseLocked | HandshakeStage::Simulating)
    }
}

/// Why the bridge ended up in simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    /// The operator pressed `s`.
    OperatorChoice,
    /// Nobody chose within the boot window.
    BootWindowElapsed,
    /// The signature register held something else.
    MagicMismatch { found: u32 },
    /// TEMP_OK never rose within the thermal budget.
    ThermalTimeout,
}

/// Boot/runtime status of the hardware link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    pub mode: BridgeMode,
    /// PHASE_LOCK sampled at the end of calibration; 0 in simulation.
    pub phase_zero: u32,
    pub fallback: Option<FallbackReason>,
}

impl BridgeState {
    pub fn simulation_mode(&self) -> bool {
        self.mode == BridgeMode::Simulation
    }
}

impl Default for BridgeState {
    fn default() -> Self {
        Self {
            mode: BridgeMode::Simulation,
            phase_zero: 0,
            fallback: None,
        }
    }
}

/// Owner of the oracle link: register file, relax primitive and the
/// simulation source.
pub struct Bridge<R: RegisterFile, X: Relax> {
    regs: R,
    relax: X,
    rng: PseudoRng,
    boot_window_polls: u32,
    thermal_timeout_polls: u32,
    settle_spins: u32,
    stage: HandshakeStage,
    state: BridgeState,
    shut_down: bool,
}

impl<R: RegisterFile, X: Relax> Bridge<R, X> {
    pub fn new(regs: R, relax: X, config: &QcoreConfig) -> Self {
        Self {
            regs,
            relax,
            rng: PseudoRng::new(config.rng_seed),
            boot_window_polls: config.boot_window_polls,
            thermal_timeout_polls: config.thermal_timeout_polls,
            settle_spins: config.settle_spins,
            stage: HandshakeStage::AwaitingOperatorChoice,
            state: BridgeState::default(),
            shut_down: false,
        }
    }

    /// Run the boot handshake.
    ///
    /// Never blocks indefinitely: every wait is bounded and every failure
    /// falls back to simulation. Calling it again after completion returns
    /// the latched state unchanged.
    pub fn handshake<C: BootConsole + ?Sized>(&mut self, console: &mut C) -> BridgeState {
        if self.stage.is_terminal() {
            log::debug!("Bridge handshake already complete ({:?})", self.stage);
            return self.state;
        }

        let mut remaining = self.boot_window_polls.max(1);
        loop {
            let choice = console.poll_byte().and_then(OperatorChoice::from_byte);
            if choice == Some(OperatorChoice::Simulation) {
                log::info!("Operator selected simulation mode");
                return self.fall_back(FallbackReason::OperatorChoice);
            }
            if remaining == 1 {
                log::warn!(
                    "No bridge mode selected within {} polls, defaulting to simulation",
                    self.boot_window_polls
                );
                return self.fall_back(FallbackReason::BootWindowElapsed);
            }
            if choice == Some(OperatorChoice::Hardware) {
                break;
            }
            remaining -= 1;
        }

        self.stage = HandshakeStage::Probing;
        log::info!("Probing collapse oracle");
        let found = self.regs.read(Register::MagicSig);
        if found != QPORT_MAGIC {
            log::warn!(
                "Oracle signature mismatch (found {found:#010X}, expected {QPORT_MAGIC:#010X}), \
                 falling back to simulation"
            );
            return self.fall_back(FallbackReason::MagicMismatch { found });
        }

        self.stage = HandshakeStage::Calibrating;
        self.regs.write(Register::Control, command::CALIBRATE);
        let mut timeout = self.thermal_timeout_polls;
        while self.regs.read(Register::Status) & status::TEMP_OK == 0 {
            self.relax.relax();
            timeout = timeout.saturating_sub(1);
            if timeout == 0 {
                log::warn!(
                    "Oracle thermal timeout after {} polls, falling back to simulation",
                    self.thermal_timeout_polls
                );
                return self.fall_back(FallbackReason::ThermalTimeout);
            }
        }

        let phase_zero = self.regs.read(Register::PhaseLock);
        self.stage = HandshakeStage::PhaseLocked;
        self.state = BridgeState {
            mode: BridgeMode::Hardware,
            phase_zero,
            fallback: None,
        };
        log::info!("Quantum bridge online, phase zero {phase_zero:#010X}");
        self.state
    }

    fn fall_back(&mut self, reason: FallbackReason) -> BridgeState {
        self.stage = HandshakeStage::Simulating;
        self.state = BridgeState {
            mode: BridgeMode::Simulation,
            phase_zero: 0,
            fallback: Some(reason),
        };
        self.state
    }

    /// One request/collapse exchange.
    ///
    /// Simulation: after `settle_spins` relax hints, draws bit 7 from the
    /// pseudo-random source and leaves bits 0–6 untouched.
    ///
    /// Hardware: writes the 7 phase bits to DATA_LATCH, issues PREPARE,
    /// spins on DATA_READY with no bound, then adopts the full byte the
    /// oracle returns (it may alter the phase bits).
    ///
    /// A bridge that never completed its handshake runs in simulation.
    pub fn tick_sync(&mut self, byte: &mut CollapseByte) -> CycleObservation {
        if self.state.simulation_mode() {
            for _ in 0..self.settle_spins {
                self.relax.relax();
            }
            byte.set_collapsed_bit(self.rng.next_bit());
        } else {
            self.regs.write(Register::DataLatch, (byte.raw() & 0x7F) as u32);
            self.regs.write(Register::Control, command::PREPARE);
            while self.regs.read(Register::Status) & status::DATA_READY == 0 {
                self.relax.relax();
            }
            let collapsed = self.regs.read(Register::DataLatch);
            *byte = CollapseByte::new((collapsed & 0xFF) as u8);
        }
        byte.observation()
    }

    /// One word of entropy for the destruct purge: the free-running sensor
    /// (inverted) in hardware mode, the local generator otherwise.
    pub fn noise_word(&mut self) -> u32 {
        if self.state.simulation_mode() {
            self.rng.next_word()
        } else {
            self.regs.read(Register::DataLatch) ^ 0xFFFF_FFFF
        }
    }

    /// Latch the oracle off so it can never re-synchronize.
    ///
    /// Only touches the registers in hardware mode.
    pub fn permanent_shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        if self.state.simulation_mode() {
            log::error!("Bridge shut down (simulation, no oracle command issued)");
        } else {
            self.regs.write(Register::Control, command::PERMANENT_SHUTDOWN);
            log::error!("PERMANENT_SHUTDOWN issued to collapse oracle");
        }
    }

    /// A handful of relax hints, used to pace the destruct purge.
    #[inline]
    pub fn pause(&mut self, hints: u32) {
        for _ in 0..hints {
            self.relax.relax();
        }
    }

    /// Park forever in the relax primitive's halt.
    pub fn halt(&mut self) -> ! {
        self.relax.halt()
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn stage(&self) -> HandshakeStage {
        self.stage
    }

    pub fn mode(&self) -> BridgeMode {
        self.state.mode
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn relax_primitive(&self) -> &X {
        &self.relax
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ScriptedConsole, SilentConsole};
    use crate::registers::UnmappedPort;
    use crate::relax::CountingRelax;
    use crate::virtual_qpu::VirtualQpu;

    fn bridge(qpu: VirtualQpu) -> Bridge<VirtualQpu, CountingRelax> {
        Bridge::new(qpu, CountingRelax::new(), &QcoreConfig::fast())
    }

    #[test]
    fn test_operator_selects_simulation() {
        let mut b = bridge(VirtualQpu::new(1));
        let state = b.handshake(&mut ScriptedConsole::new(b's', 10));
        assert!(state.simulation_mode());
        assert_eq!(state.fallback, Some(FallbackReason::OperatorChoice));
        assert_eq!(b.stage(), HandshakeStage::Simulating);
    }

    #[test]
    fn test_boot_window_elapses() {
        let mut console = ScriptedConsole::new(b'h', 5_000);
        let mut b = bridge(VirtualQpu::new(1));
        let state = b.handshake(&mut console);
        assert_eq!(state.fallback, Some(FallbackReason::BootWindowElapsed));
        assert_eq!(console.polls(), QcoreConfig::fast().boot_window_polls);
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut b = bridge(VirtualQpu::new(1));
        let state = b.handshake(&mut ScriptedConsole::immediate(b'x'));
        assert_eq!(state.fallback, Some(FallbackReason::BootWindowElapsed));
    }

    #[test]
    fn test_magic_mismatch_falls_back() {
        let mut b = bridge(VirtualQpu::new(1).with_magic(0xDEAD_BEEF));
        let state = b.handshake(&mut ScriptedConsole::immediate(b'H'));
        assert_eq!(
            state.fallback,
            Some(FallbackReason::MagicMismatch { found: 0xDEAD_BEEF })
        );
        assert!(state.simulation_mode());
    }

    #[test]
    fn test_unmapped_port_falls_back() {
        let mut b = Bridge::new(UnmappedPort, CountingRelax::new(), &QcoreConfig::fast());
        let state = b.handshake(&mut ScriptedConsole::immediate(b'h'));
        assert_eq!(
            state.fallback,
            Some(FallbackReason::MagicMismatch { found: 0 })
        );
    }

    #[test]
    fn test_thermal_timeout_falls_back() {
        let mut b = bridge(VirtualQpu::new(1).with_cooldown(None));
        let state = b.handshake(&mut ScriptedConsole::immediate(b'h'));
        assert_eq!(state.fallback, Some(FallbackReason::ThermalTimeout));
        assert_eq!(
            b.relax_primitive().hints(),
            QcoreConfig::fast().thermal_timeout_polls as u64
        );
    }

    #[test]
    fn test_hardware_handshake_latches_phase_zero() {
        let mut b = bridge(VirtualQpu::new(1).with_phase_lock(0x1234));
        let state = b.handshake(&mut ScriptedConsole::immediate(b'h'));
        assert_eq!(state.mode, BridgeMode::Hardware);
        assert_eq!(state.phase_zero, 0x1234);
        assert_eq!(state.fallback, None);
        assert_eq!(b.stage(), HandshakeStage::PhaseLocked);
    }

    #[test]
    fn test_mode_fixed_after_handshake() {
        let mut b = bridge(VirtualQpu::new(1));
        b.handshake(&mut SilentConsole);
        let again = b.handshake(&mut ScriptedConsole::immediate(b'h'));
        assert!(again.simulation_mode());
        assert_eq!(b.stage(), HandshakeStage::Simulating);
    }

    #[test]
    fn test_simulated_tick_keeps_phase_bits() {
        let mut b = bridge(VirtualQpu::new(1));
        b.handshake(&mut SilentConsole);
        let mut byte = CollapseByte::new(0x2A);
        let mut seen = [false; 2];
        for _ in 0..32 {
            let obs = b.tick_sync(&mut byte);
            assert_eq!(obs.requested_phase, 0x2A);
            assert!(obs.collapsed_bit <= 1);
            seen[obs.collapsed_bit as usize] = true;
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_simulated_tick_is_seeded() {
        let run = || {
            let mut b = bridge(VirtualQpu::new(1));
            b.handshake(&mut SilentConsole);
            let mut byte = CollapseByte::default();
            (0..16)
                .map(|_| b.tick_sync(&mut byte).collapsed_bit)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_hardware_tick_adopts_oracle_byte() {
        let mut b = bridge(VirtualQpu::new(3).with_phase_drift(1));
        b.handshake(&mut ScriptedConsole::immediate(b'h'));
        let mut byte = CollapseByte::from_parts(10, 1);
        let obs = b.tick_sync(&mut byte);
        assert_eq!(obs.requested_phase, 11);
        assert_eq!(byte.phase(), 11);
        assert_eq!(b.registers().collapses(), 1);
    }

    #[test]
    fn test_shutdown_only_touches_hardware() {
        let mut sim = bridge(VirtualQpu::new(1));
        sim.handshake(&mut SilentConsole);
        sim.permanent_shutdown();
        assert!(sim.is_shut_down());
        assert!(!sim.registers().is_shut_down());

        let mut hw = bridge(VirtualQpu::new(1));
        hw.handshake(&mut ScriptedConsole::immediate(b'h'));
        hw.permanent_shutdown();
        assert!(hw.registers().is_shut_down());
    }

    #[test]
    fn test_noise_word_sources() {
        let mut sim = bridge(VirtualQpu::new(1));
        sim.handshake(&mut SilentConsole);
        assert_ne!(sim.noise_word(), sim.noise_word());

        let mut hw = bridge(VirtualQpu::new(1));
        hw.handshake(&mut ScriptedConsole::immediate(b'h'));
        let a = hw.noise_word();
        let b = hw.noise_word();
        assert_ne!(a, b);
    }

    #[test]
    fn test_state_serialises() {
        let state = BridgeState {
            mode: BridgeMode::Hardware,
            phase_zero: 7,
            fallback: None,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"Hardware\""));
    }
}
