use std::path::Path;
use std::time::Instant;

use image::{GrayImage, Luma, Rgb, RgbImage};
use plate_core::{ColorImage, Image};

use crate::error::{AlignError, AlignResult};

/// Load any supported image file as 8-bit grayscale
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> AlignResult<Image> {
    let path = path.as_ref();
    let start = Instant::now();
    log::info!("Loading image: {}", path.display());

    let gray = image::open(path)
        .map_err(|source| AlignError::ImageLoad { path: path.to_path_buf(), source })?
        .to_luma8();
    let img = from_gray_image(&gray);

    log::info!("Loaded {}x{} in {:.2?}", img.width(), img.height(), start.elapsed());
    Ok(img)
}

pub fn from_gray_image(gray: &GrayImage) -> Image {
    Image::from_fn(gray.width() as usize, gray.height() as usize, |x, y| {
        gray.get_pixel(x as u32, y as u32)[0]
    })
}

pub fn to_gray_image(img: &Image) -> GrayImage {
    GrayImage::from_fn(img.width() as u32, img.height() as u32, |x, y| {
        Luma([img.get(x as usize, y as usize)])
    })
}

/// Channels are copied in storage order; swap BGR data before calling
pub fn to_rgb_image(img: &ColorImage) -> RgbImage {
    RgbImage::from_fn(img.width() as u32, img.height() as u32, |x, y| {
        Rgb(img.pixel(x as usize, y as usize))
    })
}

pub fn from_rgb_image(rgb: &RgbImage) -> ColorImage {
    let (w, h) = (rgb.width() as usize, rgb.height() as usize);
    let data: Vec<u8> = rgb.pixels().flat_map(|p| p.0).collect();
    ColorImage::new(w, h, data).unwrap_or_else(|_| ColorImage::default())
}
