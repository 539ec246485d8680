use plate_core::{Image, Keypoint};
use crate::types::CornerType;
use crate::utils::has_contiguous_run;
use rayon::prelude::*;

/// Corner detection algorithms (FAST and Harris)
pub struct CornerDetector;

impl CornerDetector {
    /// FAST circle offsets for corner detection, clockwise from 12 o'clock
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (0, -3), (1, -3), (2, -2), (3, -1),
        (3, 0), (3, 1), (2, 2), (1, 3),
        (0, 3), (-1, 3), (-2, 2), (-3, 1),
        (-3, 0), (-3, -1), (-2, -2), (-1, -3),
    ];

    /// Pixels kept clear of the image edge so the circle fits
    pub const BORDER: usize = 3;

    /// FAST-9: contiguous arc length required for a corner
    pub const ARC_LENGTH: usize = 9;

    /// Detect FAST corners on one image, rows in parallel.
    ///
    /// Coordinates are in the image's own frame; `angle`, `size` and
    /// `octave` are left for the caller to fill in.
    pub fn detect(img: &Image, threshold: u8, harris: bool) -> Vec<Keypoint> {
        let (width, height) = img.dimensions();
        if width < 2 * Self::BORDER + 1 || height < 2 * Self::BORDER + 1 {
            return Vec::new();
        }

        (Self::BORDER..height - Self::BORDER)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut row_keypoints = Vec::new();
                for x in Self::BORDER..width - Self::BORDER {
                    let Some(corner_type) = Self::fast_corner_type(img, x, y, threshold) else {
                        continue;
                    };
                    let response = if harris {
                        Self::compute_harris_response(img, x, y)
                    } else {
                        Self::compute_intensity_response(img, x, y, threshold, corner_type)
                    };
                    row_keypoints.push(Keypoint {
                        response,
                        ..Keypoint::new(x as f32, y as f32)
                    });
                }
                row_keypoints
            })
            .collect()
    }

    /// Segment test: returns the arc side when `ARC_LENGTH` contiguous circle
    /// pixels are all brighter or all darker than center ± threshold.
    fn fast_corner_type(img: &Image, x: usize, y: usize, threshold: u8) -> Option<CornerType> {
        let center = img.get(x, y) as i32;
        let t = threshold as i32;

        let mut brighter: u16 = 0;
        let mut darker: u16 = 0;
        for (i, &(dx, dy)) in Self::FAST_OFFSETS.iter().enumerate() {
            let pixel = Self::circle_pixel(img, x, y, dx, dy);
            if pixel > center + t {
                brighter |= 1 << i;
            } else if pixel < center - t {
                darker |= 1 << i;
            }
        }

        if has_contiguous_run(brighter, Self::ARC_LENGTH) {
            Some(CornerType::Bright)
        } else if has_contiguous_run(darker, Self::ARC_LENGTH) {
            Some(CornerType::Dark)
        } else {
            None
        }
    }

    #[inline]
    fn circle_pixel(img: &Image, x: usize, y: usize, dx: i32, dy: i32) -> i32 {
        let px = (x as i32 + dx) as usize;
        let py = (y as i32 + dy) as usize;
        img.get(px, py) as i32
    }

    /// FAST score: mean excess contrast of the circle pixels on the corner's side
    fn compute_intensity_response(img: &Image, x: usize, y: usize, threshold: u8, corner_type: CornerType) -> f32 {
        let center = img.get(x, y) as i32;
        let t = threshold as i32;
        let mut sum = 0i32;
        let mut count = 0;

        for &(dx, dy) in Self::FAST_OFFSETS.iter() {
            let diff = match corner_type {
                CornerType::Bright => Self::circle_pixel(img, x, y, dx, dy) - center,
                CornerType::Dark => center - Self::circle_pixel(img, x, y, dx, dy),
            };
            if diff > t {
                sum += diff - t;
                count += 1;
            }
        }

        if count > 0 {
            sum as f32 / count as f32
        } else {
            0.0
        }
    }

    /// Harris corner response det(M) - k * trace(M)^2 over a 5x5 window.
    ///
    /// Returns 0 when the window does not fit in the image.
    pub fn compute_harris_response(img: &Image, x: usize, y: usize) -> f32 {
        let (width, height) = img.dimensions();
        if x < 3 || y < 3 || x + 3 >= width || y + 3 >= height {
            return 0.0;
        }

        let mut ixx = 0.0f64;
        let mut ixy = 0.0f64;
        let mut iyy = 0.0f64;

        for ny in y - 2..=y + 2 {
            for nx in x - 2..=x + 2 {
                let (gx, gy) = Self::compute_gradients(img, nx, ny);
                ixx += (gx * gx) as f64;
                ixy += (gx * gy) as f64;
                iyy += (gy * gy) as f64;
            }
        }

        let k = 0.04f64;
        let det = ixx * iyy - ixy * ixy;
        let trace = ixx + iyy;
        (det - k * trace * trace) as f32
    }

    /// Image gradients using the Sobel operator; caller keeps (x, y) off the edge
    fn compute_gradients(img: &Image, x: usize, y: usize) -> (f32, f32) {
        let p = |xx: usize, yy: usize| img.get(xx, yy) as f32;

        // Sobel X kernel: [-1, 0, 1; -2, 0, 2; -1, 0, 1]
        let gx = p(x + 1, y - 1) + 2.0 * p(x + 1, y) + p(x + 1, y + 1)
            - p(x - 1, y - 1) - 2.0 * p(x - 1, y) - p(x - 1, y + 1);

        // Sobel Y kernel: [-1, -2, -1; 0, 0, 0; 1, 2, 1]
        let gy = p(x - 1, y + 1) + 2.0 * p(x, y + 1) + p(x + 1, y + 1)
            - p(x - 1, y - 1) - 2.0 * p(x, y - 1) - p(x + 1, y - 1);

        (gx / 8.0, gy / 8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bright_square(width: usize, height: usize) -> Image {
        let (cx, cy) = (width / 2, height / 2);
        Image::from_fn(width, height, |x, y| {
            if x.abs_diff(cx) <= 2 && y.abs_diff(cy) <= 2 { 255 } else { 50 }
        })
    }

    #[test]
    fn test_uniform_image_has_no_corners() {
        let img = Image::filled(20, 20, 128);
        assert!(CornerDetector::detect(&img, 20, false).is_empty());
        assert!(CornerDetector::detect(&img, 20, true).is_empty());
    }

    #[test]
    fn test_too_small_image() {
        let img = bright_square(6, 6);
        assert!(CornerDetector::detect(&img, 20, false).is_empty());
    }

    #[test]
    fn test_square_corners_detected() {
        let img = bright_square(20, 20);
        let corners = CornerDetector::detect(&img, 20, false);
        assert!(!corners.is_empty());
        // Every corner hugs the bright square
        for kp in &corners {
            assert!((kp.x - 10.0).abs() <= 4.0 && (kp.y - 10.0).abs() <= 4.0);
            assert!(kp.response > 0.0 && kp.response.is_finite());
        }
    }

    #[test]
    fn test_harris_prefers_corners_over_edges() {
        // Bright quadrant: corner at (20, 20), straight edge along x = 20 further down
        let img = Image::from_fn(40, 40, |x, y| if x >= 20 && y >= 20 { 200 } else { 30 });
        let corner = CornerDetector::compute_harris_response(&img, 20, 20);
        let edge = CornerDetector::compute_harris_response(&img, 20, 32);
        let flat = CornerDetector::compute_harris_response(&img, 8, 8);
        assert!(corner > edge);
        assert!(edge <= 0.0);
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn test_harris_outside_window() {
        let img = bright_square(20, 20);
        assert_eq!(CornerDetector::compute_harris_response(&img, 1, 10), 0.0);
        assert_eq!(CornerDetector::compute_harris_response(&img, 10, 18), 0.0);
    }
}
