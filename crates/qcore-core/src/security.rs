// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Security Monitor
// ─────────────────────────────────────────────────────────────────────
//! Three-state escalation machine over the sensitive buffer.
//!
//! ```text
//!   Laminar ──surprise > anomaly──▶ Hibernation ──surprise ≤ anomaly──▶ Laminar
//!      │                                 │
//!      └──────surprise > critical────────┴──────────▶ Singularity (terminal)
//! ```
//!
//! Hibernation XORs every buffer word with a key derived from the live
//! collapse byte. The key is latched on entry and reused on exit, so
//! recovery restores the buffer even if the byte moved in between.
//!
//! Singularity writes the forensic record, floods the sensitive buffer
//! and the purge region with noise, and shuts the oracle down.

use serde::{Deserialize, Serialize};

use qcore_bridge::{Bridge, PseudoRng, RegisterFile, Relax};
use qcore_math::Fixed;
use qcore_types::{CollapseByte, QcoreConfig, SecurityState};

/// Breach tag in word 0 of the forensic record.
pub const BREACH_MAGIC: u32 = 0xDEAD_BEEF;

/// Size of the protected forensic region in words.
pub const FORENSIC_WORDS: usize = 16;

/// Salt mixed into every phase key.
pub const PHASE_SALT: u32 = 0x5A5A_5A5A;

/// Relax hints between two purge words.
pub const PURGE_PACE_HINTS: u32 = 10;

/// First word of the demo sensitive pattern.
pub const SENTINEL_BASE: u32 = 0xCAFE_BABE;

/// Key derived from the collapse byte: raw byte in bits 24–31, phase in
/// bits 16–22, then salted.
#[inline]
pub fn phase_key(byte: CollapseByte) -> u32 {
    (((byte.raw() as u32) << 24) | ((byte.phase() as u32) << 16)) ^ PHASE_SALT
}

/// XOR every word with `key`. Applying it twice restores the buffer.
pub fn apply_phase_transform(buffer: &mut [u32], key: u32) {
    for word in buffer.iter_mut() {
        *word ^= key;
    }
}

/// Fill `buffer` with `SENTINEL_BASE + i`.
pub fn fill_sentinel(buffer: &mut [u32]) {
    for (i, word) in buffer.iter_mut().enumerate() {
        *word = SENTINEL_BASE.wrapping_add(i as u32);
    }
}

/// Source of purge entropy and the oracle's kill switch.
pub trait NoiseSource {
    fn noise_word(&mut self) -> u32;

    /// Spacing after each purge word so the noise saturates the bus.
    fn pace(&mut self) {}

    /// Prevent the source from ever re-synchronizing.
    fn permanent_shutdown(&mut self) {}
}

impl<R: RegisterFile, X: Relax> NoiseSource for Bridge<R, X> {
    fn noise_word(&mut self) -> u32 {
        Bridge::noise_word(self)
    }

    fn pace(&mut self) {
        self.pause(PURGE_PACE_HINTS);
    }

    fn permanent_shutdown(&mut self) {
        Bridge::permanent_shutdown(self)
    }
}

impl NoiseSource for PseudoRng {
    fn noise_word(&mut self) -> u32 {
        self.next_word()
    }
}

/// Fixed-layout breach record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicRecord {
    pub magic: u32,
    /// Raw Q16.16 surprise, reinterpreted as u32.
    pub surprise: u32,
    pub last_byte: u32,
}

impl ForensicRecord {
    pub fn new(surprise: Fixed, last_byte: CollapseByte) -> Self {
        Self {
            magic: BREACH_MAGIC,
            surprise: surprise.raw() as u32,
            last_byte: last_byte.raw() as u32,
        }
    }

    pub fn surprise_fixed(&self) -> Fixed {
        Fixed::from_raw(self.surprise as i32)
    }
}

/// Write-once protected region. The first record seals it; later
/// writes are refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicLog {
    words: [u32; FORENSIC_WORDS],
    sealed: bool,
}

impl ForensicLog {
    pub fn new() -> Self {
        Self {
            words: [0; FORENSIC_WORDS],
            sealed: false,
        }
    }

    /// Returns `false` if the log was already sealed.
    pub fn write(&mut self, record: ForensicRecord) -> bool {
        if self.sealed {
            return false;
        }
        self.words[0] = record.magic;
        self.words[1] = record.surprise;
        self.words[2] = record.last_byte;
        self.sealed = true;
        true
    }

    pub fn record(&self) -> Option<ForensicRecord> {
        self.sealed.then(|| ForensicRecord {
            magic: self.words[0],
            surprise: self.words[1],
            last_byte: self.words[2],
        })
    }

    pub fn words(&self) -> &[u32; FORENSIC_WORDS] {
        &self.words
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

impl Default for ForensicLog {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SecurityMonitor {
    state: SecurityState,
    anomaly_threshold: Fixed,
    critical_threshold: Fixed,
    lock_key: Option<u32>,
    forensic: ForensicLog,
    hibernations: u32,
}

impl SecurityMonitor {
    pub fn new(anomaly_threshold: Fixed, critical_threshold: Fixed) -> Self {
        Self {
            state: SecurityState::Laminar,
            anomaly_threshold,
            critical_threshold,
            lock_key: None,
            forensic: ForensicLog::new(),
            hibernations: 0,
        }
    }

    pub fn from_config(config: &QcoreConfig) -> Self {
        Self::new(config.anomaly_threshold, config.critical_threshold)
    }

    /// Evaluate one cycle's surprise.
    ///
    /// `sensitive` is locked/unlocked in place. On a critical breach both
    /// `sensitive` and `purge` are overwritten with words from `noise`,
    /// which is then shut down. Once in Singularity every call is a no-op.
    pub fn heartbeat<N: NoiseSource + ?Sized>(
        &mut self,
        sensitive: &mut [u32],
        purge: &mut [u32],
        surprise: Fixed,
        live: CollapseByte,
        noise: &mut N,
    ) -> SecurityState {
        if self.state.is_terminal() {
            return self.state;
        }

        if surprise > self.critical_threshold {
            log::error!(
                "Critical breach: surprise {} > {}, last byte {:#04X}",
                surprise,
                self.critical_threshold,
                live.raw()
            );
            if self.forensic.write(ForensicRecord::new(surprise, live)) {
                log::error!("Forensic record written");
            }
            self.trigger_singularity(sensitive, purge, noise);
        } else if surprise > self.anomaly_threshold {
            if self.state != SecurityState::Hibernation {
                let key = phase_key(live);
                apply_phase_transform(sensitive, key);
                self.lock_key = Some(key);
                self.state = SecurityState::Hibernation;
                self.hibernations = self.hibernations.saturating_add(1);
                log::info!("Hibernation: sensitive buffer locked (surprise {surprise})");
            }
        } else if self.state == SecurityState::Hibernation {
            if let Some(key) = self.lock_key.take() {
                apply_phase_transform(sensitive, key);
            }
            self.state = SecurityState::Laminar;
            log::info!("Condensation: sensitive buffer restored");
        }
        self.state
    }

    fn trigger_singularity<N: NoiseSource + ?Sized>(
        &mut self,
        sensitive: &mut [u32],
        purge: &mut [u32],
        noise: &mut N,
    ) {
        self.state = SecurityState::Singularity;
        self.lock_key = None;
        log::error!(
            "SINGULARITY: purging {} words with oracle noise",
            sensitive.len() + purge.len()
        );
        for word in sensitive.iter_mut().chain(purge.iter_mut()) {
            *word = noise.noise_word();
            noise.pace();
        }
        noise.permanent_shutdown();
    }

    pub fn state(&self) -> SecurityState {
        self.state
    }

    /// Key currently locking the buffer, if hibernating.
    pub fn lock_key(&self) -> Option<u32> {
        self.lock_key
    }

    pub fn forensic_log(&self) -> &ForensicLog {
        &self.forensic
    }

    /// Number of Laminar → Hibernation transitions.
    pub fn hibernations(&self) -> u32 {
        self.hibernations
    }
}

impl Default for SecurityMonitor {
    fn default() -> Self {
        Self::from_config(&QcoreConfig::default())
    }
}
