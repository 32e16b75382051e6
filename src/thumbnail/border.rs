//! Border no-data color detection

use std::collections::HashMap;
use image::{Rgba, RgbaImage};

/// Packs the RGB channels of a pixel as `0xRRGGBB`, ignoring alpha
pub fn pack_rgb(pixel: &Rgba<u8>) -> u32 {
    let [r, g, b, _] = pixel.0;
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Perimeter coordinates in scan order: left column top to bottom, top row
/// left to right, right column top to bottom, bottom row left to right
///
/// Corner pixels appear in two sequences and are counted twice.
pub fn border_pixels(width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let (right, bottom) = (width.saturating_sub(1), height.saturating_sub(1));
    let (w, h) = if width == 0 || height == 0 { (0, 0) } else { (width, height) };

    (0..h)
        .map(|y| (0, y))
        .chain((0..w).map(|x| (x, 0)))
        .chain((0..h).map(move |y| (right, y)))
        .chain((0..w).map(move |x| (x, bottom)))
}

/// Returns the most frequent RGB value on the image perimeter
///
/// Ties go to the color seen first in [`border_pixels`] order. An empty
/// image has no border and yields `None`.
pub fn detect_border_nodata(image: &RgbaImage) -> Option<u32> {
    // color -> (count, first position)
    let mut counts: HashMap<u32, (usize, usize)> = HashMap::new();

    for (position, (x, y)) in border_pixels(image.width(), image.height()).enumerate() {
        let entry = counts.entry(pack_rgb(image.get_pixel(x, y))).or_insert((0, position));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(color, (count, _))| {
            log::debug!("Border color {:06X} on {} perimeter pixels", color, count);
            color
        })
}
