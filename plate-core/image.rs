use crate::error::{CoreError, CoreResult};

/// Row-major 8-bit grayscale image
///
/// The sample buffer always holds exactly `width * height` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Image {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wraps a row-major buffer, checking its length against the dimensions
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> CoreResult<Self> {
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Image with every sample set to `value`
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// True when the image holds no samples
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Sample with coordinates clamped to the image border
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> u8 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.width + cx]
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable samples; the length is fixed so the size invariant holds
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Copies rows `start..start + rows` into a new image of the same width
    pub fn crop_rows(&self, start: usize, rows: usize) -> Self {
        let begin = (start * self.width).min(self.data.len());
        let end = ((start + rows) * self.width).min(self.data.len());
        let data = self.data[begin..end].to_vec();
        let height = if self.width == 0 { rows } else { data.len() / self.width };
        Self {
            width: self.width,
            height,
            data,
        }
    }
}

/// Three-channel 8-bit image with interleaved samples
///
/// The channel meaning is fixed by whoever builds it; the registration
/// pipeline produces blue, green, red in that order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl ColorImage {
    pub const CHANNELS: usize = 3;

    pub fn new(width: usize, height: usize, data: Vec<u8>) -> CoreResult<Self> {
        let expected_len = width * height * Self::CHANNELS;
        if data.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * Self::CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Extracts channel `index` (0..3) as a grayscale image
    pub fn channel(&self, index: usize) -> Option<Image> {
        if index >= Self::CHANNELS {
            return None;
        }
        let data = self
            .data
            .iter()
            .skip(index)
            .step_by(Self::CHANNELS)
            .copied()
            .collect();
        Some(Image {
            width: self.width,
            height: self.height,
            data,
        })
    }

    /// Same samples with the first and third channel swapped (BGR <-> RGB)
    pub fn swap_outer_channels(&self) -> Self {
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(Self::CHANNELS) {
            px.swap(0, 2);
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}
