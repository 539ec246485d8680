use plate_core::{Image, Keypoint};
use crate::config::DetectorConfig;
use crate::corner_detection::CornerDetector;
use crate::error::FastResult;
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;
use crate::types::ScaleLevel;
use rayon::prelude::*;

/// Multi-scale oriented FAST detector
#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: DetectorConfig,
}

impl FastDetector {
    /// Creates a new FAST detector with validation
    pub fn new(cfg: DetectorConfig) -> FastResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Build the pyramid this detector works on
    pub fn build_pyramid(&self, img: &Image) -> ImagePyramid {
        ImagePyramid::build(img, self.cfg.n_levels, self.cfg.scale_factor)
    }

    /// Detect up to `max_features` keypoints, strongest first, in base
    /// image coordinates.
    ///
    /// An empty image or one below the 7x7 minimum gives no keypoints.
    pub fn detect(&self, img: &Image, max_features: usize) -> Vec<Keypoint> {
        if img.is_empty() {
            return Vec::new();
        }
        let pyramid = self.build_pyramid(img);
        self.detect_in_pyramid(&pyramid, max_features)
    }

    /// Detect across all pyramid levels and keep the `max_features` best
    pub fn detect_in_pyramid(&self, pyramid: &ImagePyramid, max_features: usize) -> Vec<Keypoint> {
        let per_level: Vec<Vec<Keypoint>> = pyramid
            .levels()
            .par_iter()
            .map(|(scale_level, level_img)| {
                self.detect_at_scale(level_img, scale_level)
                    .into_iter()
                    .map(|kp| Self::to_base_frame(kp, scale_level))
                    .collect()
            })
            .collect();

        let mut all_keypoints: Vec<Keypoint> = per_level.into_iter().flatten().collect();
        // Stable: equal responses keep level then row-major order
        all_keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
        all_keypoints.truncate(max_features);

        log::debug!(
            "detected {} keypoints over {} pyramid levels",
            all_keypoints.len(),
            pyramid.len()
        );
        all_keypoints
    }

    /// Detect keypoints on one level, in that level's coordinates
    pub fn detect_at_scale(&self, img: &Image, scale_level: &ScaleLevel) -> Vec<Keypoint> {
        let raw = CornerDetector::detect(img, self.cfg.threshold, self.cfg.harris_corners);
        let suppressed = KeypointRefinement::non_maximum_suppression(&raw, self.cfg.nms_distance);

        suppressed
            .into_iter()
            .map(|kp| {
                let kp = if self.cfg.subpixel_refinement {
                    KeypointRefinement::refine_keypoint_subpixel(img, kp)
                } else {
                    kp
                };
                Keypoint {
                    angle: KeypointRefinement::compute_orientation(img, kp.x, kp.y, self.cfg.patch_size),
                    size: self.cfg.patch_size as f32,
                    octave: scale_level.level,
                    ..kp
                }
            })
            .collect()
    }

    /// Map a level-frame keypoint back to base image coordinates
    fn to_base_frame(kp: Keypoint, scale_level: &ScaleLevel) -> Keypoint {
        Keypoint {
            x: kp.x * scale_level.scale,
            y: kp.y * scale_level.scale,
            size: kp.size * scale_level.scale,
            ..kp
        }
    }

    /// Get detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    pub fn summary(&self) -> String {
        self.cfg.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_small_test_config() -> DetectorConfig {
        DetectorConfig {
            patch_size: 7, // Smaller patch for small images
            n_levels: 1,
            ..DetectorConfig::default()
        }
    }

    fn create_corner_image(width: usize, height: usize) -> Image {
        let (cx, cy) = (width / 2, height / 2);
        Image::from_fn(width, height, |x, y| {
            if x.abs_diff(cx) <= 2 && y.abs_diff(cy) <= 2 { 255 } else { 50 }
        })
    }

    /// Deterministic blocky texture with plenty of FAST corners
    fn create_texture_image(width: usize, height: usize) -> Image {
        Image::from_fn(width, height, |x, y| {
            let cell = (x / 3) * 7919 + (y / 3) * 104_729;
            ((cell.wrapping_mul(2_654_435_761) >> 7) % 256) as u8
        })
    }

    #[test]
    fn test_empty_image_detection() {
        let detector = FastDetector::new(create_small_test_config()).unwrap();
        assert!(detector.detect(&Image::default(), 100).is_empty());
        assert!(detector.detect(&Image::filled(0, 10, 0), 100).is_empty());
    }

    #[test]
    fn test_uniform_image_detection() {
        let detector = FastDetector::new(create_small_test_config()).unwrap();
        assert!(detector.detect(&Image::filled(10, 10, 128), 100).is_empty());
    }

    #[test]
    fn test_boundary_cases() {
        // Minimum valid size and below it
        let detector = FastDetector::new(create_small_test_config()).unwrap();
        assert!(detector.detect(&create_corner_image(7, 7), 100).len() <= 1);
        assert!(detector.detect(&create_corner_image(6, 6), 100).is_empty());
    }

    #[test]
    fn test_corner_detection() {
        let detector = FastDetector::new(create_small_test_config()).unwrap();
        let keypoints = detector.detect(&create_corner_image(20, 20), 100);
        assert!(!keypoints.is_empty());
        for kp in &keypoints {
            assert!(kp.angle.is_finite());
            assert_eq!(kp.octave, 0);
        }
    }

    #[test]
    fn test_max_features_and_ranking() {
        let detector = FastDetector::new(DetectorConfig::default()).unwrap();
        let img = create_texture_image(128, 96);
        let all = detector.detect(&img, usize::MAX);
        assert!(all.len() > 20, "only {} keypoints", all.len());

        let top = detector.detect(&img, 10);
        assert_eq!(top.len(), 10);
        for pair in top.windows(2) {
            assert!(pair[0].response >= pair[1].response);
        }
        assert_eq!(&all[..10], &top[..]);
        assert!(detector.detect(&img, 0).is_empty());
    }

    #[test]
    fn test_multiscale_keypoints_in_base_frame() {
        let detector = FastDetector::new(DetectorConfig::default()).unwrap();
        let img = create_texture_image(160, 120);
        let keypoints = detector.detect(&img, usize::MAX);
        assert!(keypoints.iter().any(|kp| kp.octave > 0));
        for kp in &keypoints {
            assert!(kp.x >= 0.0 && kp.x < 160.0);
            assert!(kp.y >= 0.0 && kp.y < 120.0);
            assert!(kp.size >= 31.0);
        }
    }

    #[test]
    fn test_fast_score_is_positive() {
        let cfg = DetectorConfig { harris_corners: false, ..create_small_test_config() };
        let detector = FastDetector::new(cfg).unwrap();
        for kp in detector.detect(&create_corner_image(20, 20), 100) {
            assert!(kp.response > 0.0);
            assert!(kp.response.is_finite());
        }
    }

    #[test]
    fn test_translation_equivariance() {
        let detector = FastDetector::new(DetectorConfig { n_levels: 1, ..DetectorConfig::default() }).unwrap();
        let base = create_texture_image(100, 40);
        let shifted = Image::from_fn(96, 40, |x, y| base.get(x + 4, y));
        let a = detector.detect(&Image::from_fn(96, 40, |x, y| base.get(x, y)), usize::MAX);
        let b = detector.detect(&shifted, usize::MAX);

        // Interior corners reappear exactly four pixels to the left
        let interior: Vec<&Keypoint> = a.iter().filter(|kp| kp.x > 20.0 && kp.x < 70.0).collect();
        assert!(!interior.is_empty());
        for kp in interior {
            assert!(
                b.iter().any(|q| (q.x - (kp.x - 4.0)).abs() < 1e-4 && (q.y - kp.y).abs() < 1e-4),
                "no counterpart for ({}, {})",
                kp.x,
                kp.y
            );
        }
    }

    #[test]
    fn test_parallel_safety() {
        let detector = FastDetector::new(DetectorConfig::default()).unwrap();
        let img = create_texture_image(100, 100);
        let first = detector.detect(&img, 500);
        for _ in 0..5 {
            assert_eq!(detector.detect(&img, 500), first);
        }
    }
}
