mod channels;
mod error;
mod image;

pub use channels::{merge_channels, split_bands, Bands};
pub use error::{CoreError, CoreResult};
pub use image::{ColorImage, Image};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Key-point ≙ FAST corner + orientation (radians) with subpixel precision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,      // Subpixel x coordinate, base level
    pub y: f32,      // Subpixel y coordinate, base level
    pub angle: f32,
    /// Patch diameter at base scale
    pub size: f32,
    /// Pyramid level the corner was detected on
    pub octave: usize,
    /// Ranking score (Harris or FAST intensity response)
    pub response: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            angle: 0.0,
            size: 0.0,
            octave: 0,
            response: 0.0,
        }
    }

    /// Location as a double-precision point for geometric estimation
    pub fn point(&self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; 32];

/// A keypoint together with the descriptor computed for it.
///
/// Keeping both in one value means a feature index always refers to a
/// consistent (location, signature) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    pub keypoint: Keypoint,
    pub descriptor: Descriptor,
}

/// Ordered features of one channel; `Match` indices point into this.
pub type FeatureSet = Vec<Feature>;

/// Correspondence between `query[query_idx]` and `train[train_idx]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    /// Hamming distance, lower is better
    pub distance: u32,
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

/// Thread count used when none is configured
pub fn default_thread_count() -> usize {
    num_cpus::get().max(1)
}
