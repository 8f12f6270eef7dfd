// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Bayesian Attractor
// ─────────────────────────────────────────────────────────────────────
//! Online 2-D Gaussian belief over (phase, outcome).
//!
//! Mean and covariance follow an exponential moving average with rate α:
//!
//!   μ ← μ + α·(x − μ)
//!   Σᵢⱼ ← Σᵢⱼ + α·(δᵢ·δ'ⱼ − Σᵢⱼ)
//!
//! where δ = x − μ_old and δ' = x − μ_new. The inverse is recomputed
//! after every update from the adjugate, with the determinant pushed out
//! of (−floor, floor) so a degenerate belief never divides by ~0.
//! Surprise is the squared Mahalanobis distance, never square-rooted.

use serde::{Deserialize, Serialize};

use qcore_math::Fixed;
use qcore_types::QcoreConfig;

pub type Vec2 = [Fixed; 2];
pub type Mat2 = [[Fixed; 2]; 2];

const IDENTITY: Mat2 = [[Fixed::ONE, Fixed::ZERO], [Fixed::ZERO, Fixed::ONE]];

/// Push `det` out of the open interval (−floor, floor), keeping its sign
/// (zero counts as positive).
#[inline]
pub fn floor_determinant(det: Fixed, floor: Fixed) -> Fixed {
    if !det.is_negative() && det < floor {
        floor
    } else if det.is_negative() && det > -floor {
        -floor
    } else {
        det
    }
}

/// Adjugate inverse of a symmetric 2×2 matrix. Returns the inverse and
/// whether the determinant floor was applied.
pub fn invert_symmetric(m: &Mat2, det_floor: Fixed) -> (Mat2, bool) {
    let a = m[0][0];
    let b = m[0][1];
    let d = m[1][1];
    let raw_det = a.mul(d) - b.mul(b);
    let det = floor_determinant(raw_det, det_floor);
    let off = (-b).div(det);
    ([[d.div(det), off], [off, a.div(det)]], det != raw_det)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BayesianAttractor {
    mean: Vec2,
    covariance: Mat2,
    inverse_covariance: Mat2,
    alpha: Fixed,
    determinant_floor: Fixed,
    variance_floor: Fixed,
    updates: u64,
    floor_activations: u64,
}

impl BayesianAttractor {
    /// Belief centred at the origin with identity covariance.
    pub fn new(config: &QcoreConfig) -> Self {
        Self {
            mean: [Fixed::ZERO; 2],
            covariance: IDENTITY,
            inverse_covariance: IDENTITY,
            alpha: config.learning_rate,
            determinant_floor: config.determinant_floor,
            variance_floor: config.variance_floor,
            updates: 0,
            floor_activations: 0,
        }
    }

    /// Learn one observation.
    pub fn update(&mut self, phase: Fixed, outcome: Fixed) {
        let x = [phase, outcome];
        let mut delta = [Fixed::ZERO; 2];
        for i in 0..2 {
            delta[i] = x[i] - self.mean[i];
            self.mean[i] += self.alpha.mul(delta[i]);
        }
        let delta_new = [x[0] - self.mean[0], x[1] - self.mean[1]];

        let c = &mut self.covariance;
        for i in 0..2 {
            let term = delta[i].mul(delta_new[i]);
            c[i][i] += self.alpha.mul(term - c[i][i]);
            if c[i][i] < self.variance_floor {
                c[i][i] = self.variance_floor;
            }
        }
        let cross = delta[0].mul(delta_new[1]);
        c[0][1] += self.alpha.mul(cross - c[0][1]);
        c[1][0] = c[0][1];

        let (inverse, floored) = invert_symmetric(&self.covariance, self.determinant_floor);
        self.inverse_covariance = inverse;
        if floored {
            self.floor_activations += 1;
            log::debug!(
                "Attractor determinant floored (update {}, Σ = {:?})",
                self.updates + 1,
                self.covariance
            );
        }
        self.updates += 1;
    }

    /// (x − μ)ᵀ Σ⁻¹ (x − μ), saturating.
    pub fn mahalanobis_sq(&self, phase: Fixed, outcome: Fixed) -> Fixed {
        let d0 = phase - self.mean[0];
        let d1 = outcome - self.mean[1];
        let inv = &self.inverse_covariance;
        let t1 = d0.mul(inv[0][0]) + d1.mul(inv[1][0]);
        let t2 = d0.mul(inv[0][1]) + d1.mul(inv[1][1]);
        t1.mul(d0) + t2.mul(d1)
    }

    pub fn mean(&self) -> Vec2 {
        self.mean
    }

    pub fn covariance(&self) -> Mat2 {
        self.covariance
    }

    pub fn inverse_covariance(&self) -> Mat2 {
        self.inverse_covariance
    }

    /// Number of learned observations.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Updates whose determinant had to be floored.
    pub fn floor_activations(&self) -> u64 {
        self.floor_activations
    }
}

impl Default for BayesianAttractor {
    fn default() -> Self {
        Self::new(&QcoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained(phase: i32, outcome: i32, n: usize) -> BayesianAttractor {
        let mut a = BayesianAttractor::default();
        for _ in 0..n {
            a.update(Fixed::from_int(phase), Fixed::from_int(outcome));
        }
        a
    }

    #[test]
    fn test_initial_identity() {
        let a = BayesianAttractor::default();
        assert_eq!(a.covariance(), IDENTITY);
        assert_eq!(a.inverse_covariance(), IDENTITY);
        assert_eq!(a.mahalanobis_sq(Fixed::from_int(2), Fixed::ONE), Fixed::from_int(5));
    }

    #[test]
    fn test_mean_moves_by_alpha() {
        let mut a = BayesianAttractor::default();
        a.update(Fixed::from_int(10), Fixed::ZERO);
        // 3276 * 10
        assert_eq!(a.mean()[0].raw(), 32_760);
        assert_eq!(a.mean()[1], Fixed::ZERO);
    }

    #[test]
    fn test_identical_pairs_converge() {
        let early = trained(64, 1, 20);
        let late = trained(64, 1, 2000);
        let x = (Fixed::from_int(64), Fixed::ONE);
        let s_late = late.mahalanobis_sq(x.0, x.1);
        assert!(s_late < early.mahalanobis_sq(x.0, x.1));
        assert!(s_late < Fixed::from_raw(0x1000), "got {s_late:?}");
        assert!((late.mean()[0] - Fixed::from_int(64)).abs() < Fixed::from_raw(64));
        assert!(late.covariance()[0][0] <= Fixed::from_raw(0x100));
    }

    #[test]
    fn test_outlier_after_convergence_is_large() {
        let a = trained(64, 1, 2000);
        let s = a.mahalanobis_sq(Fixed::ZERO, Fixed::ZERO);
        assert!(s > Fixed::from_int(16), "got {s:?}");
    }

    #[test]
    fn test_anomaly_against_narrow_belief() {
        let mut a = BayesianAttractor::default();
        let half = Fixed::HALF;
        for _ in 0..200 {
            a.update(half, half);
        }
        let typical = a.mahalanobis_sq(half, half);
        let anomaly = a.mahalanobis_sq(Fixed::from_f64(0.9), Fixed::from_f64(0.9));
        assert!(anomaly > Fixed::ONE);
        assert!(anomaly > typical);
    }

    #[test]
    fn test_covariance_symmetric() {
        let mut a = BayesianAttractor::default();
        for i in 0..300 {
            a.update(Fixed::from_int(i % 128), Fixed::from_int(i % 2));
            let c = a.covariance();
            let inv = a.inverse_covariance();
            assert_eq!(c[0][1], c[1][0]);
            assert_eq!(inv[0][1], inv[1][0]);
        }
    }

    #[test]
    fn test_degenerate_input_floors_determinant() {
        let a = trained(5, 0, 3000);
        assert!(a.floor_activations() > 0);
        assert_eq!(a.updates(), 3000);
        let c = a.covariance();
        assert!(c[0][0] >= Fixed::from_raw(64));
        assert!(c[1][1] >= Fixed::from_raw(64));
    }

    #[test]
    fn test_floor_determinant_bands() {
        let f = Fixed::from_raw(10);
        assert_eq!(floor_determinant(Fixed::ZERO, f).raw(), 10);
        assert_eq!(floor_determinant(Fixed::from_raw(9), f).raw(), 10);
        assert_eq!(floor_determinant(Fixed::from_raw(-9), f).raw(), -10);
        assert_eq!(floor_determinant(Fixed::from_raw(11), f).raw(), 11);
        assert_eq!(floor_determinant(Fixed::from_raw(-11), f).raw(), -11);
    }

    #[test]
    fn test_invert_identity_scaled() {
        let m = [[Fixed::from_int(2), Fixed::ZERO], [Fixed::ZERO, Fixed::from_int(4)]];
        let (inv, floored) = invert_symmetric(&m, Fixed::from_raw(10));
        assert!(!floored);
        assert_eq!(inv[0][0], Fixed::HALF);
        assert_eq!(inv[1][1], Fixed::ONE.div_int(4));
    }

    #[test]
    fn test_snapshot_serialises() {
        let json = serde_json::to_string(&BayesianAttractor::default()).unwrap();
        assert!(json.contains("\"covariance\":[[65536,0],[0,65536]]"));
    }
}
