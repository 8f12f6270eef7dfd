// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Control Loop
// ─────────────────────────────────────────────────────────────────────
//! The closed loop. One [`ControlLoop`] owns every stage; nothing is
//! global. Each cycle runs, in order:
//!
//! 1. **Propose**: the scheduler picks a phase, written into bits 0–6.
//! 2. **Collapse**: the bridge synchronizes with the oracle.
//! 3. **Judge**: surprise of (phase, bit) against the attractor.
//! 4. **Filter**: the decoherence filter updates visibility.
//! 5. **Correct**: the corrector absorbs the phase drift.
//! 6. **React**: dissipative cycles stimulate and reset the phase;
//!    otherwise the attractor learns unless the filter launders.
//! 7. **Pump**: the regime's pump rate goes to the sink.
//! 8. **Guard**: the security monitor reacts to the same surprise.

use qcore_bridge::{BootConsole, Bridge, BridgeState, RegisterFile, Relax};
use qcore_dynamics::{BayesianAttractor, DecoherenceFilter, PhaseScheduler, PhaseState};
use qcore_math::Fixed;
use qcore_types::{
    CollapseByte, CycleRecord, QcoreConfig, QcoreError, QcoreResult, SecurityState,
};

use crate::security::SecurityMonitor;
use crate::stimulation::StimulationSink;

/// Most records `run_cycles` reserves up front; `n` may mean "until halt".
const RESERVE_CAP: usize = 1024;

/// Loop context: bridge, dynamics, monitor, memory and sink.
///
/// `M` is any owned or borrowed word buffer: a `Vec<u32>`, a fixed array,
/// or a `&mut [u32]` over a physical region.
pub struct ControlLoop<R, X, M, S>
where
    R: RegisterFile,
    X: Relax,
    M: AsRef<[u32]> + AsMut<[u32]>,
    S: StimulationSink,
{
    config: QcoreConfig,
    bridge: Bridge<R, X>,
    scheduler: PhaseScheduler,
    corrector: PhaseState,
    attractor: BayesianAttractor,
    filter: DecoherenceFilter,
    monitor: SecurityMonitor,
    live: CollapseByte,
    sensitive: M,
    purge: M,
    sink: S,
    cycle: u64,
}

impl<R, X, M, S> ControlLoop<R, X, M, S>
where
    R: RegisterFile,
    X: Relax,
    M: AsRef<[u32]> + AsMut<[u32]>,
    S: StimulationSink,
{
    /// Validates `config` and builds every stage from it.
    ///
    /// The bridge may or may not have completed its handshake; one that
    /// has not runs in simulation.
    pub fn new(
        config: QcoreConfig,
        bridge: Bridge<R, X>,
        sensitive: M,
        purge: M,
        sink: S,
    ) -> QcoreResult<Self> {
        config.validate()?;
        Ok(Self {
            scheduler: PhaseScheduler::from_config(&config),
            corrector: PhaseState::from_config(&config),
            attractor: BayesianAttractor::new(&config),
            filter: DecoherenceFilter::new(&config),
            monitor: SecurityMonitor::from_config(&config),
            live: CollapseByte::default(),
            config,
            bridge,
            sensitive,
            purge,
            sink,
            cycle: 0,
        })
    }

    /// Run the bridge handshake.
    pub fn boot<C: BootConsole + ?Sized>(&mut self, console: &mut C) -> BridgeState {
        let state = self.bridge.handshake(console);
        log::info!(
            "QCore loop ready: mode {:?}, phase zero {:#010X}",
            state.mode,
            state.phase_zero
        );
        state
    }

    /// One full cycle. After Singularity every call fails with
    /// [`QcoreError::KernelHalt`] and touches nothing.
    pub fn step(&mut self) -> QcoreResult<CycleRecord> {
        if self.monitor.state().is_terminal() {
            return Err(QcoreError::KernelHalt(format!(
                "singularity reached at cycle {}",
                self.cycle
            )));
        }
        self.cycle += 1;

        let requested = self.scheduler.next_phase();
        self.live.set_phase(requested);

        let obs = self.bridge.tick_sync(&mut self.live);
        let (phase, outcome) = obs.to_fixed();

        let surprise = self.attractor.mahalanobis_sq(phase, outcome);

        self.filter.update(surprise, obs.collapsed_bit);

        let drift = obs.requested_phase as i32 - requested as i32;
        let corrected = self.corrector.update(Fixed::from_int(drift));

        let dissipative = surprise > self.config.dissipation_threshold;
        let mut laundered = false;
        if dissipative {
            self.sink.stimulate(surprise);
            self.live.set_phase(0);
        } else if self.filter.should_launder() {
            laundered = true;
            log::debug!(
                "Cycle {}: observation laundered (visibility {})",
                self.cycle,
                self.filter.visibility()
            );
        } else {
            self.attractor.update(phase, outcome);
        }

        let pump_rate = self.scheduler.pump_rate();
        self.sink.pump_energy(pump_rate);

        let security = self.monitor.heartbeat(
            self.sensitive.as_mut(),
            self.purge.as_mut(),
            surprise,
            self.live,
            &mut self.bridge,
        );

        Ok(CycleRecord {
            cycle: self.cycle,
            requested_phase: requested,
            observed_phase: obs.requested_phase,
            collapsed_bit: obs.collapsed_bit,
            surprise,
            visibility: self.filter.visibility(),
            axis: self.filter.axis(),
            laundered,
            dissipative,
            corrected,
            regime: self.scheduler.regime(),
            pump_rate,
            security,
        })
    }

    /// Up to `n` cycles; stops early at the halt. Returns the trace.
    pub fn run_cycles(&mut self, n: usize) -> Vec<CycleRecord> {
        let mut records = Vec::with_capacity(n.min(RESERVE_CAP));
        for _ in 0..n {
            match self.step() {
                Ok(record) => records.push(record),
                Err(_) => break,
            }
        }
        records
    }

    /// Cycle until Singularity, then park in the relax primitive's halt.
    pub fn run_forever(&mut self) -> ! {
        while self.step().is_ok() {}
        log::error!("QCore loop halted after {} cycles", self.cycle);
        self.bridge.halt()
    }

    pub fn security_state(&self) -> SecurityState {
        self.monitor.state()
    }

    pub fn is_halted(&self) -> bool {
        self.monitor.state().is_terminal()
    }

    /// Completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn live_byte(&self) -> CollapseByte {
        self.live
    }

    pub fn config(&self) -> &QcoreConfig {
        &self.config
    }

    pub fn bridge(&self) -> &Bridge<R, X> {
        &self.bridge
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn corrector(&self) -> &PhaseState {
        &self.corrector
    }

    pub fn attractor(&self) -> &BayesianAttractor {
        &self.attractor
    }

    pub fn filter(&self) -> &DecoherenceFilter {
        &self.filter
    }

    pub fn monitor(&self) -> &SecurityMonitor {
        &self.monitor
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sensitive(&self) -> &[u32] {
        self.sensitive.as_ref()
    }

    pub fn purge_region(&self) -> &[u32] {
        self.purge.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::{fill_sentinel, BREACH_MAGIC};
    use crate::stimulation::{NullSink, RecordingSink};
    use qcore_bridge::{
        BridgeMode, CountingRelax, ScriptedConsole, SilentConsole, UnmappedPort, VirtualQpu,
    };
    use qcore_types::Regime;

    type SimLoop = ControlLoop<UnmappedPort, CountingRelax, Vec<u32>, RecordingSink>;

    fn sentinel(n: usize) -> Vec<u32> {
        let mut v = vec![0; n];
        fill_sentinel(&mut v);
        v
    }

    fn sim_loop(config: QcoreConfig) -> (SimLoop, RecordingSink) {
        let sink = RecordingSink::new();
        let bridge = Bridge::new(UnmappedPort, CountingRelax::new(), &config);
        let mut l = ControlLoop::new(config, bridge, sentinel(64), vec![0; 128], sink.clone())
            .unwrap();
        let state = l.boot(&mut SilentConsole);
        assert_eq!(state.mode, BridgeMode::Simulation);
        (l, sink)
    }

    fn tolerant() -> QcoreConfig {
        QcoreConfig {
            critical_threshold: Fixed::from_int(32_000),
            ..QcoreConfig::fast()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = QcoreConfig {
            correction_interval: 0,
            ..QcoreConfig::fast()
        };
        let bridge = Bridge::new(UnmappedPort, CountingRelax::new(), &config);
        let err = ControlLoop::new(config, bridge, vec![0u32; 4], vec![0u32; 4], NullSink)
            .err()
            .unwrap();
        assert!(matches!(err, QcoreError::Config(_)));
    }

    #[test]
    fn test_first_cycle_against_identity_belief() {
        let (mut l, _) = sim_loop(QcoreConfig::fast());
        let r = l.step().unwrap();
        assert_eq!(r.cycle, 1);
        assert_eq!(r.requested_phase, 1);
        assert_eq!(r.observed_phase, 1);
        assert_eq!(r.regime, Regime::Fermionic);
        // seed 1 draws 0 first; identity belief gives 1² + 0²
        assert_eq!(r.collapsed_bit, 0);
        assert_eq!(r.surprise, Fixed::ONE);
        assert!(!r.dissipative && !r.laundered);
        assert_eq!(l.attractor().updates(), 1);
    }

    #[test]
    fn test_default_escalation_trace() {
        let (mut l, sink) = sim_loop(QcoreConfig::fast());
        let original = sentinel(64);

        let r1 = l.step().unwrap();
        assert_eq!(r1.security, SecurityState::Laminar);
        assert_eq!(l.sensitive(), &original[..]);

        let r2 = l.step().unwrap();
        assert!(r2.dissipative);
        assert_eq!(r2.security, SecurityState::Hibernation);
        assert_eq!(l.live_byte().phase(), 0);
        assert_ne!(l.sensitive(), &original[..]);
        assert_eq!(sink.residues(), vec![r2.surprise]);

        let r3 = l.step().unwrap();
        assert!(r3.laundered);
        assert_eq!(r3.security, SecurityState::Laminar);
        assert_eq!(l.sensitive(), &original[..]);

        let r4 = l.step().unwrap();
        assert_eq!(r4.security, SecurityState::Singularity);
        assert!(r4.surprise > QcoreConfig::default().critical_threshold);
        assert!(l.is_halted());
        assert!(l.bridge().is_shut_down());
        assert_ne!(l.sensitive(), &original[..]);
        assert!(l.purge_region().iter().any(|&w| w != 0));
        assert_eq!(sink.snapshot().pump_cycles, 4);
    }

    #[test]
    fn test_no_input_after_singularity() {
        let (mut l, sink) = sim_loop(QcoreConfig::fast());
        let records = l.run_cycles(100);
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].security, SecurityState::Singularity);

        let purged = l.purge_region().to_vec();
        let pumped = sink.snapshot().pump_cycles;
        for _ in 0..3 {
            assert!(matches!(l.step(), Err(QcoreError::KernelHalt(_))));
        }
        assert_eq!(l.cycle(), 4);
        assert_eq!(l.purge_region(), &purged[..]);
        assert_eq!(sink.snapshot().pump_cycles, pumped);
        assert!(l.run_cycles(10).is_empty());
    }

    #[test]
    fn test_trace_is_reproducible() {
        let (mut a, _) = sim_loop(tolerant());
        let (mut b, _) = sim_loop(tolerant());
        let ta = a.run_cycles(64);
        let tb = b.run_cycles(64);
        assert_eq!(ta.len(), 64);
        assert_eq!(ta, tb);
        assert_eq!(a.sensitive(), b.sensitive());
    }

    #[test]
    fn test_trace_golden_prefix() {
        use SecurityState::{Hibernation as H, Laminar as L};
        // (phase, bit, surprise raw, visibility raw, state) for seed 1
        let golden: [(u8, u8, i32, i32, SecurityState); 8] = [
            (1, 0, 65_536, 57_890, L),
            (3, 0, 571_756, 3_276, H),
            (2, 1, 318_809, 5_849, L),
            (4, 1, 1_094_071, 0, H),
            (5, 1, 1_678_802, 0, H),
            (6, 1, 2_394_933, 0, H),
            (6, 0, 2_325_949, 3_276, H),
            (9, 1, 5_331_725, 0, H),
        ];
        let (mut l, _) = sim_loop(tolerant());
        let trace = l.run_cycles(golden.len());
        let got: Vec<_> = trace
            .iter()
            .map(|r| {
                (
                    r.observed_phase,
                    r.collapsed_bit,
                    r.surprise.raw(),
                    r.visibility.raw(),
                    r.security,
                )
            })
            .collect();
        assert_eq!(got, golden.to_vec());
    }

    #[test]
    fn test_run_until_halt_with_unbounded_count() {
        let (mut l, _) = sim_loop(QcoreConfig::fast());
        let records = l.run_cycles(usize::MAX);
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].security, SecurityState::Singularity);
        assert!(l.is_halted());
    }

    #[test]
    fn test_seed_changes_trace() {
        let (mut a, _) = sim_loop(tolerant());
        let (mut b, _) = sim_loop(QcoreConfig {
            rng_seed: 99,
            ..tolerant()
        });
        let bits_a: Vec<u8> = a.run_cycles(32).iter().map(|r| r.collapsed_bit).collect();
        let bits_b: Vec<u8> = b.run_cycles(32).iter().map(|r| r.collapsed_bit).collect();
        assert_ne!(bits_a, bits_b);
    }

    #[test]
    fn test_record_invariants_hold() {
        let (mut l, _) = sim_loop(tolerant());
        for r in l.run_cycles(300) {
            assert!(r.requested_phase <= 127 && r.observed_phase <= 127);
            assert!(r.collapsed_bit <= 1);
            assert!(r.visibility >= Fixed::ZERO && r.visibility <= Fixed::ONE);
            assert!(r.axis >= Fixed::NEG_ONE && r.axis <= Fixed::ONE);
            match r.regime {
                Regime::Bosonic => assert_eq!(r.requested_phase % 2, 0),
                Regime::Fermionic => assert_eq!(r.requested_phase % 2, 1),
            }
            assert!(!(r.dissipative && r.laundered));
        }
        assert!(l.corrector().total_corrections() >= 300 / 7);
    }

    #[test]
    fn test_hardware_mode_over_virtual_qpu() {
        let config = tolerant();
        let qpu = VirtualQpu::new(7).with_phase_drift(3);
        let bridge = Bridge::new(qpu, CountingRelax::new(), &config);
        let mut l =
            ControlLoop::new(config, bridge, sentinel(16), vec![0u32; 16], NullSink).unwrap();
        let state = l.boot(&mut ScriptedConsole::immediate(b'h'));
        assert_eq!(state.mode, BridgeMode::Hardware);

        let records = l.run_cycles(14);
        assert_eq!(records.len(), 14);
        for r in &records {
            assert_eq!(r.observed_phase, (r.requested_phase + 3) & 0x7F);
            // a steady 3.0 drift always exceeds the 2.0 bound
            assert!(r.corrected);
        }
        assert_eq!(l.bridge().registers().collapses(), 14);
        assert_eq!(l.corrector().total_corrections(), 14);
    }

    #[test]
    fn test_hardware_singularity_shuts_oracle() {
        let config = QcoreConfig {
            anomaly_threshold: Fixed::ONE.div_int(4),
            critical_threshold: Fixed::HALF,
            ..QcoreConfig::fast()
        };
        let bridge = Bridge::new(VirtualQpu::new(1), CountingRelax::new(), &config);
        let mut l =
            ControlLoop::new(config, bridge, sentinel(16), vec![0u32; 16], NullSink).unwrap();
        l.boot(&mut ScriptedConsole::immediate(b'h'));

        let r = l.step().unwrap();
        assert_eq!(r.security, SecurityState::Singularity);
        assert!(l.bridge().registers().is_shut_down());

        let record = l.monitor().forensic_log().record().unwrap();
        assert_eq!(record.magic, BREACH_MAGIC);
        assert_eq!(record.surprise_fixed(), r.surprise);
        assert_eq!(record.last_byte, l.live_byte().raw() as u32);
        assert!(l.purge_region().iter().any(|&w| w != 0));
    }

    #[test]
    fn test_borrowed_memory() {
        let config = QcoreConfig::fast();
        let mut sensitive = sentinel(8);
        let mut purge = [0u32; 8];
        {
            let bridge = Bridge::new(UnmappedPort, CountingRelax::new(), &config);
            let mut l = ControlLoop::new(
                config,
                bridge,
                &mut sensitive[..],
                &mut purge[..],
                NullSink,
            )
            .unwrap();
            l.run_cycles(10);
            assert!(l.is_halted());
        }
        assert!(purge.iter().any(|&w| w != 0));
    }

    struct PanicOnHalt;

    impl Relax for PanicOnHalt {
        fn relax(&mut self) {}

        fn halt(&mut self) -> ! {
            panic!("kernel parked");
        }
    }

    #[test]
    #[should_panic(expected = "kernel parked")]
    fn test_run_forever_parks_after_singularity() {
        let config = QcoreConfig::fast();
        let bridge = Bridge::new(UnmappedPort, PanicOnHalt, &config);
        let mut l =
            ControlLoop::new(config, bridge, vec![0u32; 8], vec![0u32; 8], NullSink).unwrap();
        l.run_forever();
    }
}
