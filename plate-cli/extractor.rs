use plate_brief::BriefGenerator;
use plate_core::{FeatureSet, Image, Keypoint};
use plate_fast::{DetectorBuilder, DetectorConfig, FastDetector, FastResult};

/// Smallest image the FAST circle fits in
const MIN_IMAGE_SIZE: usize = 7;

/// ORB-style feature extractor: oriented FAST keypoints with steered BRIEF
/// descriptors, both computed on the same image pyramid.
#[derive(Debug, Clone)]
pub struct OrbExtractor {
    fast_detector: FastDetector,
    brief_generator: BriefGenerator,
}

impl OrbExtractor {
    pub fn new(cfg: DetectorConfig) -> FastResult<Self> {
        let brief_generator = BriefGenerator::new(cfg.patch_size);
        let fast_detector = DetectorBuilder::from_config(cfg).build()?;
        Ok(Self { fast_detector, brief_generator })
    }

    /// Detect keypoints only, strongest first
    pub fn detect_keypoints(&self, img: &Image, max_features: usize) -> Vec<Keypoint> {
        if !Self::is_usable(img) {
            return Vec::new();
        }
        self.fast_detector.detect(img, max_features)
    }

    /// Up to `max_features` features ranked by detector response.
    ///
    /// Images smaller than the detector minimum give an empty set.
    pub fn extract(&self, img: &Image, max_features: usize) -> FeatureSet {
        if !Self::is_usable(img) {
            return FeatureSet::new();
        }
        let pyramid = self.fast_detector.build_pyramid(img);
        let kps = self.fast_detector.detect_in_pyramid(&pyramid, max_features);
        self.brief_generator.describe(&pyramid, &kps)
    }

    pub fn config(&self) -> &DetectorConfig {
        self.fast_detector.config()
    }

    fn is_usable(img: &Image) -> bool {
        img.width() >= MIN_IMAGE_SIZE && img.height() >= MIN_IMAGE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(width: usize, height: usize) -> Image {
        Image::from_fn(width, height, |x, y| {
            let cell = (x / 3) * 7919 + (y / 3) * 104_729;
            ((cell.wrapping_mul(2_654_435_761) >> 7) % 256) as u8
        })
    }

    #[test]
    fn test_extract_bounded_and_ranked() {
        let extractor = OrbExtractor::new(DetectorConfig::default()).unwrap();
        let features = extractor.extract(&texture(120, 90), 50);
        assert!(!features.is_empty());
        assert!(features.len() <= 50);
        assert!(features.windows(2).all(|w| w[0].keypoint.response >= w[1].keypoint.response));
    }

    #[test]
    fn test_matches_detector_keypoints() {
        let extractor = OrbExtractor::new(DetectorConfig::default()).unwrap();
        let img = texture(100, 40);
        let kps = extractor.detect_keypoints(&img, 200);
        let features = extractor.extract(&img, 200);
        assert_eq!(kps.len(), features.len());
        assert!(kps.iter().zip(&features).all(|(k, f)| *k == f.keypoint));
    }

    #[test]
    fn test_degenerate_images_give_no_features() {
        let extractor = OrbExtractor::new(DetectorConfig::default()).unwrap();
        assert!(extractor.extract(&Image::default(), 100).is_empty());
        assert!(extractor.extract(&texture(6, 40), 100).is_empty());
        assert!(extractor.extract(&texture(40, 6), 100).is_empty());
        assert!(extractor.extract(&Image::filled(40, 40, 128), 100).is_empty());
    }

    #[test]
    fn test_zero_budget() {
        let extractor = OrbExtractor::new(DetectorConfig::default()).unwrap();
        assert!(extractor.extract(&texture(64, 64), 0).is_empty());
    }
}
