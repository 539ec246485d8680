use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use plate_core::{ColorImage, Feature, Image, Match};

use crate::image_io::from_rgb_image;

const PALETTE: [[u8; 3]; 6] = [
    [255, 64, 64],
    [64, 255, 64],
    [64, 128, 255],
    [255, 220, 0],
    [255, 0, 255],
    [0, 230, 230],
];

/// Side-by-side plot of two channels with a line per match.
///
/// `query` is drawn on the left, `train` on the right; the result is RGB.
pub fn draw_matches(
    query_img: &Image,
    query: &[Feature],
    train_img: &Image,
    train: &[Feature],
    matches: &[Match],
) -> ColorImage {
    let (qw, qh) = query_img.dimensions();
    let (tw, th) = train_img.dimensions();
    let (width, height) = (qw + tw, qh.max(th));

    let mut canvas = RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let v = if x < qw {
            if y < qh { query_img.get(x, y) } else { 0 }
        } else if y < th {
            train_img.get(x - qw, y)
        } else {
            0
        };
        Rgb([v, v, v])
    });

    for (i, m) in matches.iter().enumerate() {
        let (Some(q), Some(t)) = (query.get(m.query_idx), train.get(m.train_idx)) else {
            continue;
        };
        let color = Rgb(PALETTE[i % PALETTE.len()]);
        let start = (q.keypoint.x, q.keypoint.y);
        let end = (t.keypoint.x + qw as f32, t.keypoint.y);

        draw_line_segment_mut(&mut canvas, start, end, color);
        draw_hollow_circle_mut(&mut canvas, (start.0.round() as i32, start.1.round() as i32), 3, color);
        draw_hollow_circle_mut(&mut canvas, (end.0.round() as i32, end.1.round() as i32), 3, color);
    }

    from_rgb_image(&canvas)
}
