//! Percentage-scaled band composites
//!
//! Unlike the stretch path, samples are not rescaled: each value is
//! saturated into 0..=255 and the band composite is scaled by a
//! percentage with nearest-neighbour sampling.

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use crate::error::{Error, Result};
use crate::raster::RasterSource;

/// Largest composite: RGBA
pub const MAX_COMPOSITE_BANDS: usize = 4;

/// Output side for a `percent` scale, never less than one pixel
pub fn scaled_side(side: usize, percent: f64) -> u32 {
    let scaled = (side as f64 * percent / 100.0).round();
    scaled.clamp(1.0, u32::MAX as f64) as u32
}

/// Saturating float to byte cast; NaN becomes 0
pub fn saturate_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Checks a composite band list against the raster and the composite limit
pub fn validate_composite_bands(bands: &[usize], band_count: usize) -> Result<()> {
    if bands.is_empty() || bands.len() > MAX_COMPOSITE_BANDS {
        return Err(Error::InvalidBandSelection(format!(
            "expected 1 to {} bands, got {}",
            MAX_COMPOSITE_BANDS,
            bands.len()
        )));
    }

    match bands.iter().find(|&&band| band == 0 || band > band_count) {
        Some(&band) => Err(Error::BandOutOfRange { band, band_count }),
        None => Ok(()),
    }
}

/// Source index sampled for destination index `dst` when `source_len`
/// samples map onto `dst_len`
pub fn nearest_source(dst: usize, dst_len: usize, source_len: usize) -> usize {
    ((dst as u64 * source_len as u64) / dst_len.max(1) as u64) as usize
}

/// Reads the listed one-based bands at `percent` of the source size
///
/// Only the source rows that land in the output are read, and only their
/// sampled columns are kept.
pub fn composite_thumbnail<S>(source: &mut S, bands: &[usize], percent: f64) -> Result<DynamicImage>
where
    S: RasterSource + ?Sized,
{
    if !percent.is_finite() || percent <= 0.0 {
        return Err(Error::InvalidTarget(format!("percentage {} must be positive", percent)));
    }
    validate_composite_bands(bands, source.band_count())?;

    let dims = source.dimensions();
    if dims.is_empty() {
        return Err(Error::InvalidTarget(format!(
            "raster is {}x{}",
            dims.width, dims.height
        )));
    }

    let (width, height) = (scaled_side(dims.width, percent), scaled_side(dims.height, percent));
    let (out_width, out_height) = (width as usize, height as usize);
    let channels = bands.len();

    let columns: Vec<usize> = (0..out_width)
        .map(|x| nearest_source(x, out_width, dims.width))
        .collect();
    let mut rows = vec![vec![0.0; dims.width]; channels];
    let mut loaded_row = None;
    let mut interleaved = vec![0u8; out_width * out_height * channels];

    for y in 0..out_height {
        let source_row = nearest_source(y, out_height, dims.height);
        // Enlarging repeats rows; keep the last one
        if loaded_row != Some(source_row) {
            for (row, &band) in rows.iter_mut().zip(bands) {
                source.read_row(band - 1, source_row, row)?;
            }
            loaded_row = Some(source_row);
        }

        let start = y * out_width * channels;
        let pixels = interleaved[start..start + out_width * channels].chunks_exact_mut(channels);
        for (pixel, &column) in pixels.zip(&columns) {
            for (sample, row) in pixel.iter_mut().zip(&rows) {
                *sample = saturate_u8(row[column]);
            }
        }
    }

    log::debug!(
        "Composite of bands {:?} sampled from {}x{} to {}x{}",
        bands,
        dims.width,
        dims.height,
        width,
        height
    );

    to_image(width, height, channels, interleaved)
}

fn to_image(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<DynamicImage> {
    let image = match channels {
        1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        2 => GrayAlphaImage::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
        3 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        _ => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
    };

    image.ok_or_else(|| Error::InvalidFormat("Image buffer size mismatch".to_string()))
}
