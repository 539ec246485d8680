use crate::config::DetectorConfig;
use crate::detector::FastDetector;
use crate::error::FastResult;

/// Fluent builder for a validated `FastDetector`
#[derive(Debug, Clone, Default)]
pub struct DetectorBuilder {
    config: DetectorConfig,
}

impl DetectorBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the FAST threshold (1-127)
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the patch size for orientation and descriptors
    pub fn patch_size(mut self, patch_size: usize) -> Self {
        self.config.patch_size = patch_size;
        self
    }

    /// Set the maximum number of pyramid levels
    pub fn levels(mut self, n_levels: usize) -> Self {
        self.config.n_levels = n_levels;
        self
    }

    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.config.scale_factor = scale_factor;
        self
    }

    /// Set the non-maximum suppression (NMS) distance
    pub fn nms_distance(mut self, distance: f32) -> Self {
        self.config.nms_distance = distance;
        self
    }

    /// Enable or disable Harris corner scoring
    pub fn harris_corners(mut self, enable: bool) -> Self {
        self.config.harris_corners = enable;
        self
    }

    /// Enable or disable subpixel refinement
    pub fn subpixel_refinement(mut self, enable: bool) -> Self {
        self.config.subpixel_refinement = enable;
        self
    }

    /// Apply the single-scale preview preset
    pub fn preset_fast(mut self) -> Self {
        self.config = DetectorConfig::fast_preset();
        self
    }

    /// Apply the low-contrast preset
    pub fn preset_quality(mut self) -> Self {
        self.config = DetectorConfig::quality_preset();
        self
    }

    /// Build the detector, validating the configuration
    pub fn build(self) -> FastResult<FastDetector> {
        FastDetector::new(self.config)
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Create a builder from an existing `DetectorConfig`
    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Convert the builder into a `DetectorConfig`
    pub fn to_config(self) -> DetectorConfig {
        self.config
    }
}
