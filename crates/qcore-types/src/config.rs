// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use qcore_math::Fixed;

use crate::error::{QcoreError, QcoreResult};

/// Runtime configuration for the QCore control loop.
///
/// Fixed-point fields serialise as raw Q16.16 integers, so a JSON file
/// reproduces the loop bit-for-bit. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcoreConfig {
    /// Console polls before the handshake defaults to simulation.
    /// Default: 3_000_000.
    pub boot_window_polls: u32,

    /// Status polls waiting for TEMP_OK after CALIBRATE.
    /// Default: 10_000_000.
    pub thermal_timeout_polls: u32,

    /// Relax hints spent in the simulated collapse delay.
    /// Default: 10_000.
    pub settle_spins: u32,

    /// Seed of the simulation pseudo-random source. Default: 1.
    pub rng_seed: u32,

    /// Attractor EMA learning rate α. Default: 3276 (≈0.05).
    pub learning_rate: Fixed,

    /// Magnitude floor applied to the covariance determinant.
    /// Default: 10 raw (≈0.00015).
    pub determinant_floor: Fixed,

    /// Minimum per-axis variance kept after each attractor update.
    /// Default: 64 raw (≈1/1024). Zero disables the floor.
    pub variance_floor: Fixed,

    /// Surprise that maps to zero visibility. Default: 6.0.
    pub max_surprise: Fixed,

    /// Visibility strictly below this withholds learning. Default: 0.3.
    pub launder_threshold: Fixed,

    /// Visibility penalty for a collapse bit of 1. Default: 0.1.
    pub particle_penalty: Fixed,

    /// Visibility bonus for a collapse bit of 0. Default: 0.05.
    pub wave_bonus: Fixed,

    /// Surprise above which a cycle is dissipative. Default: 6.0.
    pub dissipation_threshold: Fixed,

    /// Surprise above which the buffer is locked (Hibernation).
    /// Default: 6.0 (0x00060000).
    pub anomaly_threshold: Fixed,

    /// Surprise above which the kernel self-destructs (Singularity).
    /// Default: 16.0 (0x00100000).
    pub critical_threshold: Fixed,

    /// Corrector accumulator bound. Default: 2.0.
    pub phase_threshold: Fixed,

    /// Corrector forced-correction period in cycles. Default: 7.
    pub correction_interval: u32,

    /// Corrector rescale factor. Default: 23488 (≈0.3584).
    pub correction_damping: Fixed,

    /// Energy pumped per bosonic cycle. Default: 0x3333 (≈0.2).
    pub pump_rate: Fixed,

    /// Words in the protected buffer allocated by bindings and demos.
    /// Default: 256.
    pub sensitive_words: usize,
}

impl Default for QcoreConfig {
    fn default() -> Self {
        Self {
            boot_window_polls: 3_000_000,
            thermal_timeout_polls: 10_000_000,
            settle_spins: 10_000,
            rng_seed: 1,
            learning_rate: Fixed::from_raw(3276),
            determinant_floor: Fixed::from_raw(10),
            variance_floor: Fixed::from_raw(64),
            max_surprise: Fixed::from_raw(0x0006_0000),
            launder_threshold: Fixed::from_raw(0x0000_4CCC),
            particle_penalty: Fixed::ONE.div_int(10),
            wave_bonus: Fixed::ONE.div_int(20),
            dissipation_threshold: Fixed::from_raw(0x0006_0000),
            anomaly_threshold: Fixed::from_raw(0x0006_0000),
            critical_threshold: Fixed::from_raw(0x0010_0000),
            phase_threshold: Fixed::from_raw(0x0002_0000),
            correction_interval: 7,
            correction_damping: Fixed::from_raw(23488),
            pump_rate: Fixed::from_raw(0x0000_3333),
            sensitive_words: 256,
        }
    }
}

impl QcoreConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> QcoreResult<()> {
        if self.anomaly_threshold >= self.critical_threshold {
            return Err(QcoreError::Config(format!(
                "anomaly_threshold must be < critical_threshold, got {} >= {}",
                self.anomaly_threshold, self.critical_threshold
            )));
        }
        if self.max_surprise <= Fixed::ZERO {
            return Err(QcoreError::Config(format!(
                "max_surprise must be > 0, got {}",
                self.max_surprise
            )));
        }
        if self.launder_threshold <= Fixed::ZERO || self.launder_threshold > Fixed::ONE {
            return Err(QcoreError::Config(format!(
                "launder_threshold must be in (0, 1], got {}",
                self.launder_threshold
            )));
        }
        if self.learning_rate <= Fixed::ZERO || self.learning_rate > Fixed::ONE {
            return Err(QcoreError::Config(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.determinant_floor < Fixed::ZERO || self.variance_floor < Fixed::ZERO {
            return Err(QcoreError::Config(format!(
                "floors must be >= 0, got determinant_floor={} variance_floor={}",
                self.determinant_floor, self.variance_floor
            )));
        }
        if self.correction_interval == 0 {
            return Err(QcoreError::Config(
                "correction_interval must be >= 1".to_string(),
            ));
        }
        if self.boot_window_polls == 0 || self.thermal_timeout_polls == 0 {
            return Err(QcoreError::Config(format!(
                "poll budgets must be > 0, got boot_window_polls={} thermal_timeout_polls={}",
                self.boot_window_polls, self.thermal_timeout_polls
            )));
        }
        if self.sensitive_words == 0 {
            return Err(QcoreError::Config(
                "sensitive_words must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> QcoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| QcoreError::Config(format!("JSON parse error: {e}")))
    }

    /// Serialise to a JSON string.
    pub fn to_json(&self) -> QcoreResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| QcoreError::Config(format!("JSON encode error: {e}")))
    }

    /// Short poll budgets for tests and host-side simulation.
    pub fn fast() -> Self {
        Self {
            boot_window_polls: 1_000,
            thermal_timeout_polls: 1_000,
            settle_spins: 16,
            ..Self::default()
        }
    }
}
