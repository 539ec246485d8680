use plate_core::Image;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, GeometryResult};
use crate::homography::Homography;

/// |det H| below this is treated as singular
const SINGULAR_DET: f64 = 1e-10;

/// Resampling kernel used by `warp_perspective`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

/// Resample `src` into a `target` (width, height) frame where `h` maps
/// source coordinates to target coordinates.
///
/// Every output pixel is pulled back through `h^-1`; pixels that land
/// outside the source are 0.
pub fn warp_perspective(
    src: &Image,
    h: &Homography,
    target: (usize, usize),
    interpolation: Interpolation,
) -> GeometryResult<Image> {
    if !h.is_finite() || h.determinant().abs() < SINGULAR_DET {
        return Err(GeometryError::SingularTransform);
    }
    let inv = h.inverse().filter(Homography::is_finite).ok_or(GeometryError::SingularTransform)?;

    let (tw, th) = target;
    let mut out = Image::filled(tw, th, 0);
    if src.is_empty() || tw == 0 {
        return Ok(out);
    }

    out.as_raw_mut().par_chunks_mut(tw).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            if let Some([sx, sy]) = inv.project([x as f64, y as f64]) {
                *px = match interpolation {
                    Interpolation::Nearest => sample_nearest(src, sx, sy),
                    Interpolation::Bilinear => sample_bilinear(src, sx, sy),
                };
            }
        }
    });

    Ok(out)
}

fn sample_nearest(img: &Image, x: f64, y: f64) -> u8 {
    let (xi, yi) = (x.round(), y.round());
    if xi < 0.0 || yi < 0.0 || xi >= img.width() as f64 || yi >= img.height() as f64 {
        return 0;
    }
    img.get(xi as usize, yi as usize)
}

/// Bilinear blend where neighbours outside the image count as 0
fn sample_bilinear(img: &Image, x: f64, y: f64) -> u8 {
    let (w, h) = (img.width() as f64, img.height() as f64);
    if !(x > -1.0 && y > -1.0 && x < w && y < h) {
        return 0;
    }
    let pixel = |xi: f64, yi: f64| {
        if xi < 0.0 || yi < 0.0 || xi >= w || yi >= h {
            0.0
        } else {
            img.get(xi as usize, yi as usize) as f64
        }
    };

    let (x0, y0) = (x.floor(), y.floor());
    let dx = x - x0;
    let dy = y - y0;
    let top = pixel(x0, y0) * (1.0 - dx) + pixel(x0 + 1.0, y0) * dx;
    let bottom = pixel(x0, y0 + 1.0) * (1.0 - dx) + pixel(x0 + 1.0, y0 + 1.0) * dx;
    (top * (1.0 - dy) + bottom * dy).round().clamp(0.0, 255.0) as u8
}
