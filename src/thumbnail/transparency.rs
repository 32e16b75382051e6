//! Color-keyed transparency

use image::RgbaImage;
use super::border::pack_rgb;

/// Returns a copy of `image` where pixels whose RGB equals `nodata` are fully
/// transparent and all others fully opaque
///
/// Existing alpha is ignored, so masking twice gives the same result.
pub fn mask_nodata(image: &RgbaImage, nodata: u32) -> RgbaImage {
    let mut masked = image.clone();
    for pixel in masked.pixels_mut() {
        pixel.0[3] = if pack_rgb(pixel) == nodata { 0 } else { 255 };
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([0, 0, 0, 255]),
            1 => Rgba([10, 20, 30, 12]),
            _ => Rgba([0, 0, 0, 0]),
        })
    }

    #[test]
    fn test_matching_pixels_become_transparent() {
        let masked = mask_nodata(&sample(), 0x000000);

        assert_eq!(masked.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(masked.get_pixel(1, 0).0, [10, 20, 30, 255]);
        assert_eq!(masked.get_pixel(2, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_masking_is_idempotent() {
        let once = mask_nodata(&sample(), 0x0A141E);
        let twice = mask_nodata(&once, 0x0A141E);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_source_untouched() {
        let image = sample();
        let _ = mask_nodata(&image, 0x000000);
        assert_eq!(image, sample());
    }
}
