// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Kernel Python Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #![deny(unsafe_code)] not applied: PyO3 macros generate unsafe code.
//! PyO3 bindings for the QCore collapse kernel.
//!
//! # FFI Safety
//!
//! - Every class owns its Rust state; nothing is borrowed across the
//!   Python boundary.
//! - Configurations are validated before they are stored; a rejected
//!   config raises `ValueError`.
//! - Fixed-point values cross as Python floats. Raw Q16.16 integers are
//!   available through `to_fixed` / `from_fixed` and the `*_raw` fields.
//! - A loop that has entered Singularity raises `RuntimeError` on `step`.
//!
//! # Usage from Python
//!
//! ```python
//! from qcore_kernel import QcoreConfig, RustControlLoop
//!
//! loop = RustControlLoop(QcoreConfig(critical_threshold=500.0))
//! trace = loop.run(64)
//! print(loop.summary())
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use qcore_bridge::{Bridge, BridgeMode, PseudoRng, ScriptedConsole, SpinRelax, VirtualQpu};
use qcore_core::{fill_sentinel, ControlLoop, RecordingSink, SecurityMonitor};
use qcore_dynamics::{BayesianAttractor, DecoherenceFilter, PhaseState};
use qcore_math::Fixed;
use qcore_types::{CollapseByte, CycleRecord, QcoreError, TraceSummary};

fn to_py_err(e: QcoreError) -> PyErr {
    match e {
        QcoreError::KernelHalt(_) => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

fn collapse_byte(phase: u8, collapsed_bit: u8) -> PyResult<CollapseByte> {
    if phase > 127 || collapsed_bit > 1 {
        return Err(to_py_err(QcoreError::Validation(format!(
            "phase must be in 0..=127 and collapsed_bit in {{0, 1}}, got {phase} / {collapsed_bit}"
        ))));
    }
    Ok(CollapseByte::from_parts(phase, collapsed_bit))
}

fn mat_to_f64(m: &[[Fixed; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [m[0][0].to_f64(), m[0][1].to_f64()],
        [m[1][0].to_f64(), m[1][1].to_f64()],
    ]
}

// ─── Config ─────────────────────────────────────────────────────────

#[pyclass(name = "QcoreConfig")]
#[derive(Clone)]
pub struct PyQcoreConfig {
    inner: qcore_types::QcoreConfig,
}

#[pymethods]
impl PyQcoreConfig {
    /// Start from the short-poll host profile; every argument given
    /// overrides one field. Floats are converted to Q16.16.
    #[new]
    #[pyo3(signature = (
        anomaly_threshold=None,
        critical_threshold=None,
        learning_rate=None,
        max_surprise=None,
        launder_threshold=None,
        phase_threshold=None,
        correction_interval=None,
        pump_rate=None,
        rng_seed=None,
        sensitive_words=None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        anomaly_threshold: Option<f64>,
        critical_threshold: Option<f64>,
        learning_rate: Option<f64>,
        max_surprise: Option<f64>,
        launder_threshold: Option<f64>,
        phase_threshold: Option<f64>,
        correction_interval: Option<u32>,
        pump_rate: Option<f64>,
        rng_seed: Option<u32>,
        sensitive_words: Option<usize>,
    ) -> PyResult<Self> {
        let mut cfg = qcore_types::QcoreConfig::fast();
        if let Some(v) = anomaly_threshold {
            cfg.anomaly_threshold = Fixed::from_f64(v);
        }
        if let Some(v) = critical_threshold {
            cfg.critical_threshold = Fixed::from_f64(v);
        }
        if let Some(v) = learning_rate {
            cfg.learning_rate = Fixed::from_f64(v);
        }
        if let Some(v) = max_surprise {
            cfg.max_surprise = Fixed::from_f64(v);
        }
        if let Some(v) = launder_threshold {
            cfg.launder_threshold = Fixed::from_f64(v);
        }
        if let Some(v) = phase_threshold {
            cfg.phase_threshold = Fixed::from_f64(v);
        }
        if let Some(v) = correction_interval {
            cfg.correction_interval = v;
        }
        if let Some(v) = pump_rate {
            cfg.pump_rate = Fixed::from_f64(v);
        }
        if let Some(v) = rng_seed {
            cfg.rng_seed = v;
        }
        if let Some(v) = sensitive_words {
            cfg.sensitive_words = v;
        }
        cfg.validate().map_err(to_py_err)?;
        Ok(Self { inner: cfg })
    }

    /// Parse and validate a JSON document of raw Q16.16 fields.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let cfg = qcore_types::QcoreConfig::from_json(json).map_err(to_py_err)?;
        cfg.validate().map_err(to_py_err)?;
        Ok(Self { inner: cfg })
    }

    /// The embedded-target defaults (long poll budgets).
    #[staticmethod]
    fn embedded() -> Self {
        Self {
            inner: qcore_types::QcoreConfig::default(),
        }
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(to_py_err)
    }

    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    #[getter]
    fn anomaly_threshold(&self) -> f64 {
        self.inner.anomaly_threshold.to_f64()
    }

    #[getter]
    fn critical_threshold(&self) -> f64 {
        self.inner.critical_threshold.to_f64()
    }

    #[getter]
    fn learning_rate(&self) -> f64 {
        self.inner.learning_rate.to_f64()
    }

    #[getter]
    fn correction_interval(&self) -> u32 {
        self.inner.correction_interval
    }

    #[getter]
    fn rng_seed(&self) -> u32 {
        self.inner.rng_seed
    }

    #[getter]
    fn sensitive_words(&self) -> usize {
        self.inner.sensitive_words
    }

    fn __repr__(&self) -> String {
        format!(
            "QcoreConfig(anomaly_threshold={}, critical_threshold={}, rng_seed={})",
            self.inner.anomaly_threshold, self.inner.critical_threshold, self.inner.rng_seed
        )
    }
}

fn config_or_default(config: Option<&PyQcoreConfig>) -> qcore_types::QcoreConfig {
    config
        .map(|c| c.inner.clone())
        .unwrap_or_else(qcore_types::QcoreConfig::fast)
}

// ─── Attractor ──────────────────────────────────────────────────────

#[pyclass(name = "RustBayesianAttractor")]
pub struct PyBayesianAttractor {
    inner: BayesianAttractor,
}

#[pymethods]
impl PyBayesianAttractor {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&PyQcoreConfig>) -> Self {
        Self {
            inner: BayesianAttractor::new(&config_or_default(config)),
        }
    }

    fn update(&mut self, phase: f64, outcome: f64) {
        self.inner
            .update(Fixed::from_f64(phase), Fixed::from_f64(outcome));
    }

    fn mahalanobis_sq(&self, phase: f64, outcome: f64) -> f64 {
        self.inner
            .mahalanobis_sq(Fixed::from_f64(phase), Fixed::from_f64(outcome))
            .to_f64()
    }

    /// Bit-exact variant over raw Q16.16 inputs.
    fn mahalanobis_sq_raw(&self, phase: i32, outcome: i32) -> i32 {
        self.inner
            .mahalanobis_sq(Fixed::from_raw(phase), Fixed::from_raw(outcome))
            .raw()
    }

    fn mean(&self) -> (f64, f64) {
        let m = self.inner.mean();
        (m[0].to_f64(), m[1].to_f64())
    }

    fn covariance(&self) -> [[f64; 2]; 2] {
        mat_to_f64(&self.inner.covariance())
    }

    fn inverse_covariance(&self) -> [[f64; 2]; 2] {
        mat_to_f64(&self.inner.inverse_covariance())
    }

    #[getter]
    fn updates(&self) -> u64 {
        self.inner.updates()
    }

    #[getter]
    fn floor_activations(&self) -> u64 {
        self.inner.floor_activations()
    }
}

// ─── Decoherence Filter ─────────────────────────────────────────────

#[pyclass(name = "RustDecoherenceFilter")]
pub struct PyDecoherenceFilter {
    inner: DecoherenceFilter,
}

#[pymethods]
impl PyDecoherenceFilter {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&PyQcoreConfig>) -> Self {
        Self {
            inner: DecoherenceFilter::new(&config_or_default(config)),
        }
    }

    /// Feed one cycle. Returns whether the observation should be laundered.
    fn update(&mut self, surprise: f64, collapsed_bit: u8) -> PyResult<bool> {
        if collapsed_bit > 1 {
            return Err(to_py_err(QcoreError::Validation(format!(
                "collapsed_bit must be 0 or 1, got {collapsed_bit}"
            ))));
        }
        self.inner.update(Fixed::from_f64(surprise), collapsed_bit);
        Ok(self.inner.should_launder())
    }

    fn should_launder(&self) -> bool {
        self.inner.should_launder()
    }

    #[getter]
    fn visibility(&self) -> f64 {
        self.inner.visibility().to_f64()
    }

    #[getter]
    fn axis(&self) -> f64 {
        self.inner.axis().to_f64()
    }

    #[getter]
    fn gamma_ratio(&self) -> f64 {
        self.inner.gamma_ratio().to_f64()
    }

    #[getter]
    fn cycle_count(&self) -> u32 {
        self.inner.cycle_count()
    }
}

// ─── Phase Corrector ────────────────────────────────────────────────

#[pyclass(name = "RustPhaseState")]
pub struct PyPhaseState {
    inner: PhaseState,
}

#[pymethods]
impl PyPhaseState {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&PyQcoreConfig>) -> Self {
        Self {
            inner: PhaseState::from_config(&config_or_default(config)),
        }
    }

    /// Accumulate one innovation. Returns True when a correction fired.
    fn update(&mut self, innovation: f64) -> bool {
        self.inner.update(Fixed::from_f64(innovation))
    }

    fn is_laminar(&self) -> bool {
        self.inner.is_laminar()
    }

    #[getter]
    fn accumulator(&self) -> f64 {
        self.inner.accumulator().to_f64()
    }

    #[getter]
    fn cycle_count(&self) -> u32 {
        self.inner.cycle_count()
    }

    #[getter]
    fn total_corrections(&self) -> u32 {
        self.inner.total_corrections()
    }
}

// ─── Security Monitor ───────────────────────────────────────────────

/// Monitor over its own sentinel-filled buffer, purged from a seeded
/// pseudo-random source on a critical breach.
#[pyclass(name = "RustSecurityMonitor")]
pub struct PySecurityMonitor {
    inner: SecurityMonitor,
    buffer: Vec<u32>,
    noise: PseudoRng,
}

#[pymethods]
impl PySecurityMonitor {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&PyQcoreConfig>) -> Self {
        let cfg = config_or_default(config);
        let mut buffer = vec![0u32; cfg.sensitive_words];
        fill_sentinel(&mut buffer);
        Self {
            inner: SecurityMonitor::from_config(&cfg),
            buffer,
            noise: PseudoRng::new(cfg.rng_seed),
        }
    }

    /// Evaluate one surprise against the live byte. Returns the state name.
    fn heartbeat(&mut self, surprise: f64, phase: u8, collapsed_bit: u8) -> PyResult<String> {
        let live = collapse_byte(phase, collapsed_bit)?;
        let state = self.inner.heartbeat(
            &mut self.buffer,
            &mut [],
            Fixed::from_f64(surprise),
            live,
            &mut self.noise,
        );
        Ok(format!("{state:?}"))
    }

    #[getter]
    fn state(&self) -> String {
        format!("{:?}", self.inner.state())
    }

    #[getter]
    fn lock_key(&self) -> Option<u32> {
        self.inner.lock_key()
    }

    #[getter]
    fn hibernations(&self) -> u32 {
        self.inner.hibernations()
    }

    fn buffer(&self) -> Vec<u32> {
        self.buffer.clone()
    }

    /// The sealed breach record, or None.
    fn forensic_record(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        let Some(rec) = self.inner.forensic_log().record() else {
            return Ok(None);
        };
        let dict = PyDict::new(py);
        dict.set_item("magic", rec.magic)?;
        dict.set_item("surprise", rec.surprise_fixed().to_f64())?;
        dict.set_item("surprise_raw", rec.surprise)?;
        dict.set_item("last_byte", rec.last_byte)?;
        Ok(Some(dict.into()))
    }
}

// ─── Control Loop ───────────────────────────────────────────────────

type HostLoop = ControlLoop<VirtualQpu, SpinRelax, Vec<u32>, RecordingSink>;

fn record_to_dict<'py>(py: Python<'py>, r: &CycleRecord) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("cycle", r.cycle)?;
    dict.set_item("requested_phase", r.requested_phase)?;
    dict.set_item("observed_phase", r.observed_phase)?;
    dict.set_item("collapsed_bit", r.collapsed_bit)?;
    dict.set_item("surprise", r.surprise.to_f64())?;
    dict.set_item("surprise_raw", r.surprise.raw())?;
    dict.set_item("visibility", r.visibility.to_f64())?;
    dict.set_item("axis", r.axis.to_f64())?;
    dict.set_item("laundered", r.laundered)?;
    dict.set_item("dissipative", r.dissipative)?;
    dict.set_item("corrected", r.corrected)?;
    dict.set_item("regime", format!("{:?}", r.regime))?;
    dict.set_item("pump_rate", r.pump_rate.to_f64())?;
    dict.set_item("security", format!("{:?}", r.security))?;
    Ok(dict)
}

/// Full loop over a virtual QPU with owned memory and a recording sink.
///
/// Every cycle record and every residue is kept for `summary()`,
/// `trace_json()` and `residues()`, so memory grows with the number of
/// cycles run. Long sessions call `clear_trace()` between batches.
#[pyclass(name = "RustControlLoop")]
pub struct PyControlLoop {
    inner: HostLoop,
    sink: RecordingSink,
    trace: Vec<CycleRecord>,
}

#[pymethods]
impl PyControlLoop {
    /// `hardware=True` completes the handshake against the virtual QPU;
    /// otherwise the operator picks simulation at the first poll.
    #[new]
    #[pyo3(signature = (config=None, hardware=false, phase_drift=0))]
    fn new(config: Option<&PyQcoreConfig>, hardware: bool, phase_drift: u8) -> PyResult<Self> {
        let cfg = config_or_default(config);
        let qpu = VirtualQpu::new(cfg.rng_seed).with_phase_drift(phase_drift);
        let bridge = Bridge::new(qpu, SpinRelax, &cfg);
        let mut sensitive = vec![0u32; cfg.sensitive_words];
        fill_sentinel(&mut sensitive);
        let purge = vec![0u32; cfg.sensitive_words];
        let sink = RecordingSink::new();
        let mut inner =
            ControlLoop::new(cfg, bridge, sensitive, purge, sink.clone()).map_err(to_py_err)?;
        let choice = if hardware { b'h' } else { b's' };
        inner.boot(&mut ScriptedConsole::immediate(choice));
        Ok(Self {
            inner,
            sink,
            trace: Vec::new(),
        })
    }

    /// Run one cycle and return its record as a dict.
    fn step(&mut self, py: Python<'_>) -> PyResult<PyObject> {
        let record = self.inner.step().map_err(to_py_err)?;
        self.trace.push(record);
        Ok(record_to_dict(py, &record)?.into())
    }

    /// Run up to `n` cycles, stopping early on Singularity.
    fn run(&mut self, py: Python<'_>, n: usize) -> PyResult<PyObject> {
        let records = self.inner.run_cycles(n);
        let list = PyList::empty(py);
        for r in &records {
            list.append(record_to_dict(py, r)?)?;
        }
        self.trace.extend(records);
        Ok(list.into())
    }

    /// Aggregate over every cycle run so far.
    fn summary(&self, py: Python<'_>) -> PyResult<PyObject> {
        let s = TraceSummary::from_records(&self.trace);
        let dict = PyDict::new(py);
        dict.set_item("cycles", s.cycles)?;
        dict.set_item("learned", s.learned)?;
        dict.set_item("laundered", s.laundered)?;
        dict.set_item("dissipative", s.dissipative)?;
        dict.set_item("corrections", s.corrections)?;
        dict.set_item("hibernation_cycles", s.hibernation_cycles)?;
        dict.set_item("max_surprise", s.max_surprise.to_f64())?;
        dict.set_item("final_state", format!("{:?}", s.final_state))?;
        Ok(dict.into())
    }

    /// The whole trace as JSON, fixed-point fields raw.
    fn trace_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.trace).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Drop the kept trace and the sink's residues. The loop state is
    /// untouched.
    fn clear_trace(&mut self) {
        self.trace.clear();
        self.sink.clear();
    }

    /// Residues delivered to the stimulation sink.
    fn residues(&self) -> Vec<f64> {
        self.sink.residues().iter().map(|r| r.to_f64()).collect()
    }

    fn sensitive_buffer(&self) -> Vec<u32> {
        self.inner.sensitive().to_vec()
    }

    #[getter]
    fn cycle(&self) -> u64 {
        self.inner.cycle()
    }

    #[getter]
    fn security_state(&self) -> String {
        format!("{:?}", self.inner.security_state())
    }

    #[getter]
    fn is_halted(&self) -> bool {
        self.inner.is_halted()
    }

    #[getter]
    fn hardware(&self) -> bool {
        self.inner.bridge().mode() == BridgeMode::Hardware
    }

    #[getter]
    fn oracle_shut_down(&self) -> bool {
        self.inner.bridge().is_shut_down()
    }
}

// ─── Fixed-Point Helpers ────────────────────────────────────────────

#[pyfunction]
fn to_fixed(value: f64) -> i32 {
    Fixed::from_f64(value).raw()
}

#[pyfunction]
fn from_fixed(raw: i32) -> f64 {
    Fixed::from_raw(raw).to_f64()
}

/// O_n = parity(n) · cos(π · φ · n), evaluated in Q16.16.
#[pyfunction]
fn golden_operator(n: i32) -> f64 {
    qcore_math::golden_operator(n).to_f64()
}

#[pyfunction]
fn fixed_cos(angle: f64) -> f64 {
    qcore_math::cos(Fixed::from_f64(angle)).to_f64()
}

/// Returns (l_symp, l_metr).
#[pyfunction]
fn compute_lagrangian(u: f64, v: f64) -> (f64, f64) {
    let l = qcore_math::compute_lagrangian(Fixed::from_f64(u), Fixed::from_f64(v));
    (l.l_symp.to_f64(), l.l_metr.to_f64())
}

// ─── Module ─────────────────────────────────────────────────────────

#[pymodule]
fn qcore_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyQcoreConfig>()?;
    m.add_class::<PyBayesianAttractor>()?;
    m.add_class::<PyDecoherenceFilter>()?;
    m.add_class::<PyPhaseState>()?;
    m.add_class::<PySecurityMonitor>()?;
    m.add_class::<PyControlLoop>()?;
    m.add_function(wrap_pyfunction!(to_fixed, m)?)?;
    m.add_function(wrap_pyfunction!(from_fixed, m)?)?;
    m.add_function(wrap_pyfunction!(golden_operator, m)?)?;
    m.add_function(wrap_pyfunction!(fixed_cos, m)?)?;
    m.add_function(wrap_pyfunction!(compute_lagrangian, m)?)?;
    Ok(())
}
