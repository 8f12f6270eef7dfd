// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all QCore kernel failures.
///
/// Degeneracy (singular covariance, division by zero), hardware absence
/// and statistical anomalies are absorbed inside the loop and never
/// surface here. Only boundary misuse and the terminal halt do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QcoreError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid input at an API boundary (buffer sizes, phase range).
    #[error("validation error: {0}")]
    Validation(String),

    /// The loop entered Singularity and refuses further input.
    #[error("kernel halt: {0}")]
    KernelHalt(String),

    /// Hardware link problem reported at a boundary.
    #[error("hardware error: {0}")]
    Hardware(String),
}

pub type QcoreResult<T> = Result<T, QcoreError>;
