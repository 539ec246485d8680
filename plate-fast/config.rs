use crate::error::{FastError, FastResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete detector configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// FAST intensity threshold (1-127)
    pub threshold: u8,
    /// Side of the square patch used for orientation and descriptors, odd
    pub patch_size: usize,
    /// Maximum number of pyramid levels, level 0 included
    pub n_levels: usize,
    /// Downscale ratio between consecutive pyramid levels
    pub scale_factor: f32,
    /// Minimum distance between surviving corners on one level
    pub nms_distance: f32,
    /// Rank corners by Harris response instead of FAST intensity score
    pub harris_corners: bool,
    pub subpixel_refinement: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            patch_size: 31,
            n_levels: 8,
            scale_factor: 1.2,
            nms_distance: 3.0,
            harris_corners: true,
            subpixel_refinement: true,
        }
    }
}

impl DetectorConfig {
    /// Single-scale, FAST-score ranking; for quick previews
    pub fn fast_preset() -> Self {
        Self {
            threshold: 30,
            n_levels: 1,
            nms_distance: 5.0,
            harris_corners: false,
            subpixel_refinement: false,
            ..Self::default()
        }
    }

    /// Lower threshold and denser corners for faded or low-contrast plates
    pub fn quality_preset() -> Self {
        Self {
            threshold: 12,
            nms_distance: 2.0,
            ..Self::default()
        }
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "DetectorConfig: threshold={}, patch_size={}, levels={}x{:.2}, nms={:.1}, harris={}, subpixel={}",
            self.threshold,
            self.patch_size,
            self.n_levels,
            self.scale_factor,
            self.nms_distance,
            self.harris_corners,
            self.subpixel_refinement
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> FastResult<()> {
        // 0 would detect everything, >127 overflows the u8 comparisons
        if self.threshold == 0 || self.threshold > 127 {
            return Err(FastError::InvalidThreshold(self.threshold));
        }
        if self.patch_size % 2 == 0 || self.patch_size < 7 {
            return Err(FastError::InvalidPatchSize { patch_size: self.patch_size });
        }
        if !(self.scale_factor > 1.0 && self.scale_factor.is_finite()) {
            return Err(FastError::InvalidScaleFactor(self.scale_factor));
        }
        if self.n_levels == 0 || self.n_levels > 16 {
            return Err(FastError::InvalidLevelCount(self.n_levels));
        }
        if !(self.nms_distance >= 0.0 && self.nms_distance.is_finite()) {
            return Err(FastError::InvalidNmsDistance(self.nms_distance));
        }
        Ok(())
    }
}
