use plate_core::Image;
use crate::types::ScaleLevel;

/// Levels above the base stop once either side would drop below this
const MIN_LEVEL_SIZE: usize = 32;

/// Image pyramid for multi-scale feature detection
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<(ScaleLevel, Image)>,
}

impl ImagePyramid {
    /// Generate scale levels for an image of the given size.
    ///
    /// Level 0 (the input itself) is always present; further levels are
    /// added while both dimensions stay at or above `MIN_LEVEL_SIZE`.
    pub fn generate_scale_levels(width: usize, height: usize, n_levels: usize, scale_factor: f32) -> Vec<ScaleLevel> {
        let mut levels = vec![ScaleLevel { level: 0, scale: 1.0, width, height }];
        let mut current_scale = 1.0f32;

        for level in 1..n_levels {
            current_scale *= scale_factor;
            let scaled_width = ((width as f32) / current_scale).round() as usize;
            let scaled_height = ((height as f32) / current_scale).round() as usize;

            if scaled_width < MIN_LEVEL_SIZE || scaled_height < MIN_LEVEL_SIZE {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
            });
        }

        levels
    }

    /// Build image pyramid from base image
    pub fn build(img: &Image, n_levels: usize, scale_factor: f32) -> Self {
        let scale_levels = Self::generate_scale_levels(img.width(), img.height(), n_levels, scale_factor);
        let levels = scale_levels
            .into_iter()
            .map(|scale_level| {
                let level_img = if scale_level.level == 0 {
                    img.clone()
                } else {
                    Self::downsample_image(img, scale_level.width, scale_level.height)
                };
                (scale_level, level_img)
            })
            .collect();
        Self { levels }
    }

    pub fn levels(&self) -> &[(ScaleLevel, Image)] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Downsample image using bilinear interpolation
    fn downsample_image(img: &Image, target_width: usize, target_height: usize) -> Image {
        let x_ratio = img.width() as f32 / target_width as f32;
        let y_ratio = img.height() as f32 / target_height as f32;

        Image::from_fn(target_width, target_height, |x, y| {
            // Sample at the center of the covered source area
            let src_x = ((x as f32 + 0.5) * x_ratio - 0.5).max(0.0);
            let src_y = ((y as f32 + 0.5) * y_ratio - 0.5).max(0.0);
            Self::bilinear_sample(img, src_x, src_y).round().clamp(0.0, 255.0) as u8
        })
    }

    /// Sample image at fractional coordinates using bilinear interpolation
    fn bilinear_sample(img: &Image, x: f32, y: f32) -> f32 {
        let (width, height) = img.dimensions();
        let x1 = (x.floor() as usize).min(width - 1);
        let y1 = (y.floor() as usize).min(height - 1);
        let x2 = (x1 + 1).min(width - 1);
        let y2 = (y1 + 1).min(height - 1);

        let fx = x - x1 as f32;
        let fy = y - y1 as f32;

        let p11 = img.get(x1, y1) as f32;
        let p12 = img.get(x2, y1) as f32;
        let p21 = img.get(x1, y2) as f32;
        let p22 = img.get(x2, y2) as f32;

        let interpolated_top = p11 * (1.0 - fx) + p12 * fx;
        let interpolated_bottom = p21 * (1.0 - fx) + p22 * fx;

        interpolated_top * (1.0 - fy) + interpolated_bottom * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_image_keeps_base_level_only() {
        let levels = ImagePyramid::generate_scale_levels(90, 10, 8, 1.2);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0], ScaleLevel { level: 0, scale: 1.0, width: 90, height: 10 });
    }

    #[test]
    fn test_level_sizes_shrink() {
        let levels = ImagePyramid::generate_scale_levels(640, 480, 8, 1.2);
        assert_eq!(levels.len(), 8);
        for pair in levels.windows(2) {
            assert!(pair[1].width < pair[0].width);
            assert!(pair[1].scale > pair[0].scale);
        }
    }

    #[test]
    fn test_level_limit() {
        let levels = ImagePyramid::generate_scale_levels(640, 480, 3, 1.2);
        assert_eq!(levels.len(), 3);
    }

    #[test]
    fn test_downsample_uniform() {
        let img = Image::filled(100, 80, 77);
        let pyramid = ImagePyramid::build(&img, 4, 1.5);
        assert_eq!(pyramid.len(), 3);
        for (level, level_img) in pyramid.levels() {
            assert_eq!(level_img.dimensions(), (level.width, level.height));
            assert!(level_img.as_raw().iter().all(|&v| v == 77));
        }
    }
}
