//! Trichrome plate registration.
//!
//! A plate scan holds three exposures (blue, green, red) stacked top to
//! bottom. `Aligner` splits them, matches ORB features of the blue and red
//! bands against green, fits a homography per pair with RANSAC, warps both
//! onto green and merges the result into one color composite.

mod config;
mod error;
mod extractor;
mod image_io;
mod pipeline;
mod sink;
mod visualize;

pub use config::AlignConfig;
pub use error::{AlignError, AlignResult, ChannelPair, Stage};
pub use extractor::OrbExtractor;
pub use image_io::{from_gray_image, from_rgb_image, load_grayscale, to_gray_image, to_rgb_image};
pub use pipeline::{AlignmentReport, Aligner, PairAlignment};
pub use sink::{Artifact, DisplaySink, NullSink, OwnedArtifact, PngSink, RecordingSink, SinkResult};
pub use visualize::draw_matches;

pub use plate_core::{self, ColorImage, Image};
pub use plate_geometry::{Homography, Interpolation};
