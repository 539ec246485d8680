use std::time::Instant;

use plate_core::{merge_channels, split_bands, Bands, ColorImage, Feature, Image, Match};
use plate_geometry::{warp_perspective, Homography, HomographyEstimator};
use plate_match::{correspondences, retain_best, HammingMatcher};

use crate::config::AlignConfig;
use crate::error::{AlignError, AlignResult, ChannelPair, Stage};
use crate::extractor::OrbExtractor;
use crate::sink::{Artifact, DisplaySink};
use crate::visualize::draw_matches;

/// Minimum correspondences for a homography
const MIN_CORRESPONDENCES: usize = 4;

/// Inlier ratios below this are logged as suspicious
const LOW_INLIER_RATIO: f64 = 0.5;

/// How one channel was registered against green
#[derive(Debug, Clone)]
pub struct PairAlignment {
    /// Maps the channel's coordinates into the green frame
    pub homography: Homography,
    pub n_matches: usize,
    pub n_kept: usize,
    pub n_inliers: usize,
}

#[derive(Debug, Clone)]
pub struct AlignmentReport {
    /// Channels stored blue, green, red
    pub composite: ColorImage,
    pub blue_to_green: PairAlignment,
    pub red_to_green: PairAlignment,
}

/// The registration pipeline: split, extract, match, filter, estimate,
/// warp and merge.
#[derive(Debug, Clone)]
pub struct Aligner {
    config: AlignConfig,
    extractor: OrbExtractor,
    matcher: HammingMatcher,
    estimator: HomographyEstimator,
}

impl Aligner {
    pub fn new(config: AlignConfig) -> AlignResult<Self> {
        config.validate()?;
        let extractor = OrbExtractor::new(config.detector.clone())?;
        let estimator =
            HomographyEstimator::new(config.ransac.clone()).map_err(|e| AlignError::InvalidConfig(e.to_string()))?;
        Ok(Self { config, extractor, matcher: HammingMatcher::new(), estimator })
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Register the three bands of `plate` onto the green band.
    ///
    /// Intermediate results and the composite are passed to `sink`; the
    /// run is successful once the sink has taken the composite.
    pub fn align(&self, plate: &Image, sink: &mut dyn DisplaySink) -> AlignResult<AlignmentReport> {
        let start = Instant::now();
        let bands = split_bands(plate);
        for (label, band) in bands.iter() {
            if band.is_empty() {
                return Err(AlignError::DegenerateInput { band: label, width: band.width(), height: band.height() });
            }
            show(sink, label, Artifact::Gray(band))?;
        }
        log::info!("Split {}x{} plate into {}x{} bands", plate.width(), plate.height(), bands.green.width(), bands.green.height());

        let (blue, green, red) = self.extract_all(&bands);
        log::info!("Features: blue {}, green {}, red {}", blue.len(), green.len(), red.len());

        let (h_blue, blue_to_green) = self.register(ChannelPair::BlueGreen, &bands.blue, &blue, &bands.green, &green, sink)?;
        let (h_red, red_to_green) = self.register(ChannelPair::RedGreen, &bands.red, &red, &bands.green, &green, sink)?;

        let target = bands.green.dimensions();
        let interp = self.config.interpolation;
        let (blue_warped, red_warped) = rayon::join(
            || warp_perspective(&bands.blue, &h_blue, target, interp),
            || warp_perspective(&bands.red, &h_red, target, interp),
        );
        let blue_warped = blue_warped.map_err(|source| AlignError::Geometry {
            pair: ChannelPair::BlueGreen,
            stage: Stage::Warp,
            source,
        })?;
        let red_warped = red_warped.map_err(|source| AlignError::Geometry {
            pair: ChannelPair::RedGreen,
            stage: Stage::Warp,
            source,
        })?;

        let composite = merge_channels(&blue_warped, &bands.green, &red_warped)
            .map_err(|source| AlignError::Image { stage: Stage::Composite, source })?;
        show(sink, "composite", Artifact::Bgr(&composite))?;

        log::info!("Aligned plate in {:.2?}", start.elapsed());
        Ok(AlignmentReport { composite, blue_to_green, red_to_green })
    }

    /// Features of all three bands, extracted concurrently
    fn extract_all(&self, bands: &Bands) -> (Vec<Feature>, Vec<Feature>, Vec<Feature>) {
        let max = self.config.max_features;
        let (blue, (green, red)) = rayon::join(
            || self.extractor.extract(&bands.blue, max),
            || {
                rayon::join(
                    || self.extractor.extract(&bands.green, max),
                    || self.extractor.extract(&bands.red, max),
                )
            },
        );
        (blue, green, red)
    }

    /// Match, filter and fit the homography taking `moving` onto `reference`
    fn register(
        &self,
        pair: ChannelPair,
        moving_img: &Image,
        moving: &[Feature],
        reference_img: &Image,
        reference: &[Feature],
        sink: &mut dyn DisplaySink,
    ) -> AlignResult<(Homography, PairAlignment)> {
        let matches = self.matcher.match_features(moving, reference);
        let kept: Vec<Match> = retain_best(&matches, self.config.keep_fraction);
        log::debug!("[{}] {} matches, {} kept", pair, matches.len(), kept.len());

        let plot = draw_matches(moving_img, moving, reference_img, reference, &kept);
        show(sink, &format!("matches {}", pair), Artifact::Rgb(&plot))?;

        if kept.len() < MIN_CORRESPONDENCES {
            return Err(AlignError::InsufficientCorrespondences {
                pair,
                found: kept.len(),
                needed: MIN_CORRESPONDENCES,
            });
        }

        let (src, dst) = correspondences(moving, reference, &kept);
        let estimate = self
            .estimator
            .estimate(&src, &dst)
            .map_err(|source| AlignError::Geometry { pair, stage: Stage::Estimate, source })?;

        if estimate.inlier_ratio() < LOW_INLIER_RATIO {
            log::warn!(
                "[{}] only {} of {} correspondences are inliers",
                pair,
                estimate.n_inliers,
                kept.len()
            );
        }
        log::info!("[{}] homography from {} inliers: {:?}", pair, estimate.n_inliers, estimate.homography.matrix());

        let alignment = PairAlignment {
            homography: estimate.homography,
            n_matches: matches.len(),
            n_kept: kept.len(),
            n_inliers: estimate.n_inliers,
        };
        Ok((estimate.homography, alignment))
    }
}

fn show(sink: &mut dyn DisplaySink, label: &str, artifact: Artifact<'_>) -> AlignResult<()> {
    sink.show(label, artifact)
        .map_err(|e| AlignError::Sink { label: label.to_string(), message: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{NullSink, RecordingSink};

    #[test]
    fn test_empty_plate_is_rejected() {
        let aligner = Aligner::new(AlignConfig::default()).unwrap();
        let err = aligner.align(&Image::filled(30, 2, 0), &mut NullSink).unwrap_err();
        assert!(matches!(err, AlignError::DegenerateInput { band: "blue", .. }));
        assert_eq!(err.stage(), Stage::Split);
    }

    #[test]
    fn test_featureless_plate_reports_pair() {
        let aligner = Aligner::new(AlignConfig::default()).unwrap();
        let mut sink = RecordingSink::new();
        let err = aligner.align(&Image::filled(60, 60, 128), &mut sink).unwrap_err();
        assert!(matches!(err, AlignError::InsufficientCorrespondences { found: 0, .. }));
        assert_eq!(err.pair(), Some(ChannelPair::BlueGreen));
        assert_eq!(sink.labels(), vec!["blue", "green", "red", "matches blue-green"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AlignConfig { keep_fraction: 0.0, ..AlignConfig::default() };
        assert!(matches!(Aligner::new(config), Err(AlignError::InvalidConfig(_))));
    }
}
