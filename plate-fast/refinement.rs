use plate_core::{Image, Keypoint};
use std::collections::HashMap;

/// Subpixel refinement, orientation and suppression of detected corners
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// Refine keypoint to subpixel accuracy using quadratic surface fitting.
    ///
    /// Returns the keypoint unchanged at the border or when the fit is flat.
    pub fn refine_keypoint_subpixel(img: &Image, kp: Keypoint) -> Keypoint {
        let (width, height) = img.dimensions();
        let x = kp.x.round() as usize;
        let y = kp.y.round() as usize;

        if x < 1 || y < 1 || x + 1 >= width || y + 1 >= height {
            return kp;
        }

        let s = |dx: isize, dy: isize| img.get((x as isize + dx) as usize, (y as isize + dy) as usize) as f32;

        // f(x,y) = Ax² + By² + Cxy + Dx + Ey + F via finite differences
        let dx = (s(1, 0) - s(-1, 0)) / 2.0;
        let dy = (s(0, 1) - s(0, -1)) / 2.0;
        let dxx = s(1, 0) - 2.0 * s(0, 0) + s(-1, 0);
        let dyy = s(0, 1) - 2.0 * s(0, 0) + s(0, -1);
        let dxy = (s(1, 1) - s(-1, 1) - s(1, -1) + s(-1, -1)) / 4.0;

        let det = dxx * dyy - dxy * dxy;
        if det.abs() < 1e-6 {
            return kp;
        }

        // One Newton step towards the extremum
        let offset_x = (-(dyy * dx - dxy * dy) / det).clamp(-0.5, 0.5);
        let offset_y = (-(dxx * dy - dxy * dx) / det).clamp(-0.5, 0.5);

        Keypoint {
            x: x as f32 + offset_x,
            y: y as f32 + offset_y,
            ..kp
        }
    }

    /// Orientation by intensity centroid over a disc of radius `patch_size / 2`.
    ///
    /// The radius shrinks to the distance from the image edge so the disc
    /// always fits; a zero radius gives angle 0.
    pub fn compute_orientation(img: &Image, x: f32, y: f32, patch_size: usize) -> f32 {
        let (width, height) = img.dimensions();
        let cx = x.round() as isize;
        let cy = y.round() as isize;
        if cx < 0 || cy < 0 || cx >= width as isize || cy >= height as isize {
            return 0.0;
        }

        let edge = cx
            .min(cy)
            .min(width as isize - 1 - cx)
            .min(height as isize - 1 - cy);
        let radius = ((patch_size / 2) as isize).min(edge);
        if radius == 0 {
            return 0.0;
        }

        let mut m10 = 0i64;
        let mut m01 = 0i64;
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let yy = (cy + dy) as usize;
            for dx in -radius..=radius {
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let val = img.get((cx + dx) as usize, yy) as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }

    /// Keep the strongest keypoints at least `min_distance` apart.
    ///
    /// Strongest first; ties keep input order. Uses a bucket grid so the
    /// cost stays linear in the number of candidates.
    pub fn non_maximum_suppression(keypoints: &[Keypoint], min_distance: f32) -> Vec<Keypoint> {
        let mut sorted_keypoints = keypoints.to_vec();
        sorted_keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));

        if min_distance <= 0.0 {
            return sorted_keypoints;
        }

        let cell = min_distance;
        let min_distance_sq = min_distance * min_distance;
        let mut grid: HashMap<(i64, i64), Vec<(f32, f32)>> = HashMap::new();
        let mut suppressed = Vec::new();

        for candidate in sorted_keypoints {
            let gx = (candidate.x / cell).floor() as i64;
            let gy = (candidate.y / cell).floor() as i64;

            let too_close = (gy - 1..=gy + 1).any(|ny| {
                (gx - 1..=gx + 1).any(|nx| {
                    grid.get(&(nx, ny)).is_some_and(|bucket| {
                        bucket.iter().any(|&(ax, ay)| {
                            let dx = candidate.x - ax;
                            let dy = candidate.y - ay;
                            dx * dx + dy * dy < min_distance_sq
                        })
                    })
                })
            });

            if !too_close {
                grid.entry((gx, gy)).or_default().push((candidate.x, candidate.y));
                suppressed.push(candidate);
            }
        }

        suppressed
    }
}
