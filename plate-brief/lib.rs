use plate_core::{Descriptor, Feature, FeatureSet, Image, Keypoint};
use plate_fast::ImagePyramid;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

const DESCRIPTOR_SIZE: usize = 32;
const N_TESTS: usize = DESCRIPTOR_SIZE * 8;

/// Fixed so every run (and every channel) uses the same sampling pattern
const PATTERN_SEED: u64 = 0x5EED_B21E;

/// Steered BRIEF: 256 intensity comparisons around each keypoint, rotated
/// by the keypoint angle and taken on a smoothed copy of its pyramid level.
#[derive(Debug, Clone)]
pub struct BriefGenerator {
    pairs: Vec<[(f32, f32); 2]>,
}

impl BriefGenerator {
    pub fn new(patch_size: usize) -> Self {
        let half = (patch_size / 2).max(1) as f32;
        let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
        let mut point = || loop {
            let p = (rng.gen_range(-half..=half), rng.gen_range(-half..=half));
            // Stay inside the disc so any rotation keeps the test in the patch
            if p.0 * p.0 + p.1 * p.1 <= half * half {
                return p;
            }
        };
        let pairs = (0..N_TESTS).map(|_| [point(), point()]).collect();
        Self { pairs }
    }

    /// Describe every keypoint, producing features in keypoint order.
    ///
    /// Keypoints are in base-image coordinates; `octave` selects the
    /// pyramid level that is sampled.
    pub fn describe(&self, pyramid: &ImagePyramid, kps: &[Keypoint]) -> FeatureSet {
        let descriptors = self.generate_descriptors(pyramid, kps);
        kps.iter()
            .zip(descriptors)
            .map(|(&keypoint, descriptor)| Feature { keypoint, descriptor })
            .collect()
    }

    pub fn generate_descriptors(&self, pyramid: &ImagePyramid, kps: &[Keypoint]) -> Vec<Descriptor> {
        let smoothed: Vec<(f32, Image)> = pyramid
            .levels()
            .par_iter()
            .map(|(level, img)| (level.scale, smooth(img)))
            .collect();

        let descriptors: Vec<Descriptor> = kps
            .par_iter()
            .map(|kp| match smoothed.get(kp.octave).or_else(|| smoothed.first()) {
                Some((scale, img)) => self.describe_one(img, kp.x / scale, kp.y / scale, kp.angle),
                None => [0u8; DESCRIPTOR_SIZE],
            })
            .collect();
        log::debug!("computed {} descriptors over {} levels", descriptors.len(), smoothed.len());
        descriptors
    }

    /// Descriptor for a point given in the sampled image's own frame
    pub fn describe_one(&self, img: &Image, cx: f32, cy: f32, angle: f32) -> Descriptor {
        let mut d = [0u8; DESCRIPTOR_SIZE];
        if img.is_empty() {
            return d;
        }
        let (s, c) = angle.sin_cos();

        for (i, [(dx1, dy1), (dx2, dy2)]) in self.pairs.iter().enumerate() {
            // Apply rotation and translation for subpixel coordinates
            let (rx1, ry1) = (cx + c * dx1 - s * dy1, cy + s * dx1 + c * dy1);
            let (rx2, ry2) = (cx + c * dx2 - s * dy2, cy + s * dx2 + c * dy2);

            let val1 = bilinear_sample(img, rx1, ry1);
            let val2 = bilinear_sample(img, rx2, ry2);

            let bit = (val1 < val2) as u8;
            d[i / 8] |= bit << (i % 8);
        }
        d
    }
}

impl Default for BriefGenerator {
    fn default() -> Self {
        Self::new(31)
    }
}

/// Bilinear interpolation with coordinates clamped to the image
fn bilinear_sample(img: &Image, x: f32, y: f32) -> f32 {
    let (w, h) = img.dimensions();
    let x = x.clamp(0.0, (w - 1) as f32);
    let y = y.clamp(0.0, (h - 1) as f32);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let dx = x - x0 as f32;
    let dy = y - y0 as f32;

    let top = img.get(x0, y0) as f32 * (1.0 - dx) + img.get(x1, y0) as f32 * dx;
    let bottom = img.get(x0, y1) as f32 * (1.0 - dx) + img.get(x1, y1) as f32 * dx;
    top * (1.0 - dy) + bottom * dy
}

/// Separable [1 4 6 4 1] / 16 blur with clamped borders
pub fn smooth(img: &Image) -> Image {
    const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];
    if img.is_empty() {
        return img.clone();
    }
    let (w, h) = img.dimensions();

    let horizontal: Vec<u32> = (0..h)
        .flat_map(|y| {
            (0..w).map(move |x| {
                KERNEL
                    .iter()
                    .enumerate()
                    .map(|(k, &wt)| wt * img.get_clamped(x as isize + k as isize - 2, y as isize) as u32)
                    .sum::<u32>()
            })
        })
        .collect();

    Image::from_fn(w, h, |x, y| {
        let sum: u32 = KERNEL
            .iter()
            .enumerate()
            .map(|(k, &wt)| {
                let yy = (y as isize + k as isize - 2).clamp(0, h as isize - 1) as usize;
                wt * horizontal[yy * w + x]
            })
            .sum();
        ((sum + 128) / 256) as u8
    })
}
