use rand::{rngs::StdRng, seq::index, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};
use crate::homography::{estimate_dlt, Homography};

const SAMPLE_SIZE: usize = 4;

/// Sine of the smallest angle below which three points count as collinear
const COLLINEAR_SINE: f64 = 1e-6;

/// RANSAC parameters for homography fitting
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RansacConfig {
    /// Inlier threshold on reprojection error, pixels
    pub reproj_threshold: f64,
    pub max_iters: usize,
    /// Probability of drawing at least one outlier-free sample
    pub confidence: f64,
    /// Fraction of correspondences that must agree with the final model
    pub min_inlier_ratio: f64,
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            reproj_threshold: 3.0,
            max_iters: 2000,
            confidence: 0.995,
            min_inlier_ratio: 0.2,
            seed: 0,
        }
    }
}

impl RansacConfig {
    pub fn validate(&self) -> GeometryResult<()> {
        if !(self.reproj_threshold.is_finite() && self.reproj_threshold > 0.0) {
            return Err(GeometryError::InvalidParameter { name: "reproj_threshold", value: self.reproj_threshold });
        }
        if self.max_iters == 0 {
            return Err(GeometryError::InvalidParameter { name: "max_iters", value: 0.0 });
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(GeometryError::InvalidParameter { name: "confidence", value: self.confidence });
        }
        if !(0.0..=1.0).contains(&self.min_inlier_ratio) {
            return Err(GeometryError::InvalidParameter { name: "min_inlier_ratio", value: self.min_inlier_ratio });
        }
        Ok(())
    }
}

/// Fitted model plus the consensus that supports it
#[derive(Debug, Clone)]
pub struct HomographyEstimate {
    pub homography: Homography,
    pub inlier_mask: Vec<bool>,
    pub n_inliers: usize,
    /// Reprojection error of every correspondence under `homography`
    pub errors: Vec<f64>,
}

impl HomographyEstimate {
    pub fn inlier_ratio(&self) -> f64 {
        if self.inlier_mask.is_empty() {
            0.0
        } else {
            self.n_inliers as f64 / self.inlier_mask.len() as f64
        }
    }
}

/// Outlier-robust homography estimation by random sample consensus
#[derive(Debug, Clone, Default)]
pub struct HomographyEstimator {
    config: RansacConfig,
}

impl HomographyEstimator {
    pub fn new(config: RansacConfig) -> GeometryResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RansacConfig {
        &self.config
    }

    /// Estimate `H` with `dst ~ H(src)`.
    pub fn estimate(&self, src: &[[f64; 2]], dst: &[[f64; 2]]) -> GeometryResult<HomographyEstimate> {
        let n = src.len();
        if n < SAMPLE_SIZE || n != dst.len() {
            return Err(GeometryError::InsufficientCorrespondences {
                needed: SAMPLE_SIZE,
                src_len: n,
                dst_len: dst.len(),
            });
        }
        if src.iter().chain(dst).any(|p| !(p[0].is_finite() && p[1].is_finite())) {
            return Err(GeometryError::DegenerateConfiguration);
        }

        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut best: Option<(Homography, usize)> = None;
        let mut iterations = cfg.max_iters;
        let mut iter = 0;

        while iter < iterations {
            iter += 1;
            let sample = index::sample(&mut rng, n, SAMPLE_SIZE).into_vec();
            let s: Vec<[f64; 2]> = sample.iter().map(|&i| src[i]).collect();
            let d: Vec<[f64; 2]> = sample.iter().map(|&i| dst[i]).collect();
            if has_collinear_triple(&s) || has_collinear_triple(&d) {
                continue;
            }
            let Ok(h) = estimate_dlt(&s, &d) else {
                continue;
            };

            let count = count_inliers(&h, src, dst, cfg.reproj_threshold);
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((h, count));
                iterations = iterations.min(required_iterations(count as f64 / n as f64, cfg.confidence));
            }
        }

        let (sample_h, sample_count) = best.ok_or(GeometryError::DegenerateConfiguration)?;
        log::debug!("RANSAC: {} iterations, best sample has {} of {} inliers", iter, sample_count, n);

        // Least-squares refit on the consensus set
        let homography = match inliers(&sample_h, src, dst, cfg.reproj_threshold) {
            (s, d) if s.len() >= SAMPLE_SIZE => match estimate_dlt(&s, &d) {
                Ok(refit) if count_inliers(&refit, src, dst, cfg.reproj_threshold) >= sample_count => refit,
                _ => sample_h,
            },
            _ => sample_h,
        };

        let errors: Vec<f64> = src.iter().zip(dst).map(|(&s, &d)| homography.reprojection_error(s, d)).collect();
        let inlier_mask: Vec<bool> = errors.iter().map(|&e| e <= cfg.reproj_threshold).collect();
        let n_inliers = inlier_mask.iter().filter(|&&m| m).count();

        let needed = ((cfg.min_inlier_ratio * n as f64).ceil() as usize).max(SAMPLE_SIZE);
        if n_inliers < needed {
            return Err(GeometryError::InsufficientInliers { found: n_inliers, needed, total: n });
        }

        Ok(HomographyEstimate { homography, inlier_mask, n_inliers, errors })
    }
}

fn count_inliers(h: &Homography, src: &[[f64; 2]], dst: &[[f64; 2]], threshold: f64) -> usize {
    src.iter().zip(dst).filter(|(s, d)| h.reprojection_error(**s, **d) <= threshold).count()
}

fn inliers(h: &Homography, src: &[[f64; 2]], dst: &[[f64; 2]], threshold: f64) -> (Vec<[f64; 2]>, Vec<[f64; 2]>) {
    src.iter()
        .zip(dst)
        .filter(|(s, d)| h.reprojection_error(**s, **d) <= threshold)
        .map(|(s, d)| (*s, *d))
        .unzip()
}

fn collinear(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> bool {
    let (ux, uy) = (b[0] - a[0], b[1] - a[1]);
    let (vx, vy) = (c[0] - a[0], c[1] - a[1]);
    let cross = (ux * vy - uy * vx).abs();
    cross <= COLLINEAR_SINE * ux.hypot(uy) * vx.hypot(vy)
}

fn has_collinear_triple(pts: &[[f64; 2]]) -> bool {
    let n = pts.len();
    (0..n).any(|i| (i + 1..n).any(|j| (j + 1..n).any(|k| collinear(pts[i], pts[j], pts[k]))))
}

/// Iterations needed to draw one all-inlier sample with the given confidence
fn required_iterations(inlier_ratio: f64, confidence: f64) -> usize {
    let p_good = inlier_ratio.powi(SAMPLE_SIZE as i32);
    if p_good >= 1.0 {
        return 1;
    }
    if p_good <= 0.0 {
        return usize::MAX;
    }
    let k = (1.0 - confidence).ln() / (1.0 - p_good).ln();
    if k.is_finite() { k.ceil().max(1.0) as usize } else { usize::MAX }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;
    use rand::Rng;

    fn truth() -> Homography {
        Homography::from_matrix(Matrix3::new(0.97, 0.05, 12.0, -0.04, 1.01, -6.0, 2e-4, 1e-4, 1.0))
    }

    fn grid(n: usize) -> Vec<[f64; 2]> {
        (0..n).map(|i| [(i % 10) as f64 * 17.0 + 3.0, (i / 10) as f64 * 11.0 + 5.0]).collect()
    }

    #[test]
    fn test_exact_correspondences() {
        let src = grid(40);
        let dst: Vec<[f64; 2]> = src.iter().map(|&p| truth().project(p).unwrap()).collect();
        let est = HomographyEstimator::default().estimate(&src, &dst).unwrap();
        assert_eq!(est.n_inliers, 40);
        assert!(est.errors.iter().all(|&e| e < 1e-6));
    }

    #[test]
    fn test_rejects_outliers() {
        let mut rng = StdRng::seed_from_u64(9);
        let src = grid(60);
        let mut dst: Vec<[f64; 2]> = src.iter().map(|&p| truth().project(p).unwrap()).collect();
        for d in dst.iter_mut().step_by(4) {
            *d = [d[0] + rng.gen_range(40.0..90.0), d[1] - rng.gen_range(20.0..50.0)];
        }

        let est = HomographyEstimator::default().estimate(&src, &dst).unwrap();
        for (i, &p) in src.iter().enumerate().filter(|(i, _)| i % 4 != 0) {
            assert!(est.inlier_mask[i]);
            assert!(est.homography.reprojection_error(p, truth().project(p).unwrap()) < 1e-6);
        }
        assert_eq!(est.n_inliers, 45);
    }

    #[test]
    fn test_recovers_transform_under_noise() {
        let mut rng = StdRng::seed_from_u64(3);
        let src = grid(80);
        let dst: Vec<[f64; 2]> = src
            .iter()
            .map(|&p| {
                let q = truth().project(p).unwrap();
                [q[0] + rng.gen_range(-0.3..0.3), q[1] + rng.gen_range(-0.3..0.3)]
            })
            .collect();

        let est = HomographyEstimator::default().estimate(&src, &dst).unwrap();
        assert_eq!(est.n_inliers, 80);
        for &p in &src {
            assert!(est.homography.reprojection_error(p, truth().project(p).unwrap()) < 0.5);
        }
    }

    #[test]
    fn test_insufficient_correspondences() {
        let est = HomographyEstimator::default();
        let pts = grid(3);
        assert_eq!(
            est.estimate(&pts, &pts).unwrap_err(),
            GeometryError::InsufficientCorrespondences { needed: 4, src_len: 3, dst_len: 3 }
        );
        assert!(matches!(
            est.estimate(&grid(6), &grid(5)),
            Err(GeometryError::InsufficientCorrespondences { src_len: 6, dst_len: 5, .. })
        ));
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let src: Vec<[f64; 2]> = (0..8).map(|i| [i as f64 * 5.0, i as f64 * 2.0]).collect();
        let dst: Vec<[f64; 2]> = src.iter().map(|p| [p[0] + 1.0, p[1]]).collect();
        assert_eq!(
            HomographyEstimator::default().estimate(&src, &dst).unwrap_err(),
            GeometryError::DegenerateConfiguration
        );
    }

    #[test]
    fn test_inlier_ratio_floor() {
        let mut rng = StdRng::seed_from_u64(21);
        let src = grid(50);
        let dst: Vec<[f64; 2]> = src
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                if i < 6 {
                    truth().project(p).unwrap()
                } else {
                    [rng.gen_range(0.0..500.0), rng.gen_range(0.0..500.0)]
                }
            })
            .collect();
        let cfg = RansacConfig { min_inlier_ratio: 0.5, ..RansacConfig::default() };
        assert!(matches!(
            HomographyEstimator::new(cfg).unwrap().estimate(&src, &dst),
            Err(GeometryError::InsufficientInliers { needed: 25, total: 50, .. })
        ));
    }

    #[test]
    fn test_seed_reproducibility() {
        let mut rng = StdRng::seed_from_u64(5);
        let src = grid(40);
        let dst: Vec<[f64; 2]> = src
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let q = truth().project(p).unwrap();
                if i % 3 == 0 { [q[0] + rng.gen_range(5.0..30.0), q[1]] } else { [q[0] + rng.gen_range(-0.5..0.5), q[1]] }
            })
            .collect();
        let cfg = RansacConfig { seed: 42, ..RansacConfig::default() };
        let a = HomographyEstimator::new(cfg.clone()).unwrap().estimate(&src, &dst).unwrap();
        let b = HomographyEstimator::new(cfg).unwrap().estimate(&src, &dst).unwrap();
        assert_eq!(a.homography, b.homography);
        assert_eq!(a.inlier_mask, b.inlier_mask);
    }

    #[test]
    fn test_config_validation() {
        assert!(RansacConfig::default().validate().is_ok());
        let bad = [
            RansacConfig { reproj_threshold: 0.0, ..RansacConfig::default() },
            RansacConfig { max_iters: 0, ..RansacConfig::default() },
            RansacConfig { confidence: 1.0, ..RansacConfig::default() },
            RansacConfig { min_inlier_ratio: 1.5, ..RansacConfig::default() },
        ];
        for cfg in bad {
            assert!(matches!(HomographyEstimator::new(cfg), Err(GeometryError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_required_iterations() {
        assert_eq!(required_iterations(1.0, 0.995), 1);
        assert_eq!(required_iterations(0.0, 0.995), usize::MAX);
        // 0.5^4 = 1/16 -> ln(0.005) / ln(15/16) = 82.1
        assert_eq!(required_iterations(0.5, 0.995), 83);
    }

    #[test]
    fn test_collinear_check() {
        assert!(collinear([0.0, 0.0], [1.0, 1.0], [3.0, 3.0]));
        assert!(collinear([2.0, 2.0], [2.0, 2.0], [5.0, 1.0]));
        assert!(!collinear([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]));
        let ratio = HomographyEstimate {
            homography: Homography::identity(),
            inlier_mask: vec![true, false, true, true],
            n_inliers: 3,
            errors: vec![0.0; 4],
        }
        .inlier_ratio();
        assert_relative_eq!(ratio, 0.75);
    }
}
