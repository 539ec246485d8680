//! Planar projective geometry for channel registration.
//!
//! `HomographyEstimator` fits a homography to matched points with RANSAC
//! over a normalized DLT, and `warp_perspective` resamples an image into
//! the reference frame through it.

mod error;
mod homography;
mod ransac;
mod warp;

pub use error::{GeometryError, GeometryResult};
pub use homography::{estimate_dlt, Homography};
pub use ransac::{HomographyEstimate, HomographyEstimator, RansacConfig};
pub use warp::{warp_perspective, Interpolation};
