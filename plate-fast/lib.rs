//! Oriented multi-scale FAST corner detection.
//!
//! Corners are found with the FAST-9 segment test on every level of an
//! image pyramid, ranked by Harris response (or FAST score), thinned by
//! non-maximum suppression, refined to subpixel accuracy and given an
//! intensity-centroid orientation.

mod builder;
mod config;
mod corner_detection;
mod detector;
mod error;
mod pyramid;
mod refinement;
mod types;
mod utils;

pub use builder::DetectorBuilder;
pub use config::DetectorConfig;
pub use corner_detection::CornerDetector;
pub use detector::FastDetector;
pub use error::{FastError, FastResult};
pub use pyramid::ImagePyramid;
pub use refinement::KeypointRefinement;
pub use types::ScaleLevel;
pub use utils::has_contiguous_run;
