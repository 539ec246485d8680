use crate::error::{CoreError, CoreResult};
use crate::image::{ColorImage, Image};

/// The three exposures of a plate, top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bands {
    pub blue: Image,
    pub green: Image,
    pub red: Image,
}

impl Bands {
    /// Bands in plate order (blue, green, red) with their labels
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Image)> {
        [("blue", &self.blue), ("green", &self.green), ("red", &self.red)].into_iter()
    }
}

/// Slice a stacked plate scan into three equal-height bands.
///
/// Band height is `height / 3`; leftover rows at the bottom are dropped.
/// An empty input gives three empty bands.
pub fn split_bands(plate: &Image) -> Bands {
    let band_height = plate.height() / 3;
    Bands {
        blue: plate.crop_rows(0, band_height),
        green: plate.crop_rows(band_height, band_height),
        red: plate.crop_rows(2 * band_height, band_height),
    }
}

/// Interleave three same-sized grayscale images into one color image.
///
/// Output channel `i` is argument `i`.
pub fn merge_channels(first: &Image, second: &Image, third: &Image) -> CoreResult<ColorImage> {
    let expected = first.dimensions();
    for (index, img) in [second, third].into_iter().enumerate() {
        if img.dimensions() != expected {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: img.dimensions(),
                index: index + 1,
            });
        }
    }

    let (a, b, c) = (first.as_raw(), second.as_raw(), third.as_raw());
    let mut data = Vec::with_capacity(a.len() * ColorImage::CHANNELS);
    for i in 0..a.len() {
        data.extend_from_slice(&[a[i], b[i], c[i]]);
    }
    ColorImage::new(expected.0, expected.1, data)
}
