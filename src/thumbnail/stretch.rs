//! Strided decimation and linear 8-bit stretch

use crate::error::{Error, Result};
use crate::raster::RasterSource;
use crate::types::Dimensions;
use super::{BandSelection, BandStats, EncodedImage};

/// Sampling step shared by both axes
///
/// The step for a target size `t` is `floor(1 / scale)` with
/// `scale = min(t / width, t / height)`, never less than 1. Sources smaller
/// than the target are copied at full resolution, not upsampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimationStride {
    step: usize,
}

impl DecimationStride {
    pub fn new(step: usize) -> Self {
        Self { step: step.max(1) }
    }

    /// Computes the stride that fits `dims` into a `target_size` square
    pub fn for_target(dims: Dimensions, target_size: u32) -> Result<Self> {
        if target_size == 0 {
            return Err(Error::InvalidTarget("target size must be positive".to_string()));
        }
        if dims.is_empty() {
            return Err(Error::InvalidTarget(format!(
                "raster is {}x{}",
                dims.width, dims.height
            )));
        }

        // floor(1 / (t / longest)) computed exactly in integers
        let longest = dims.width.max(dims.height);
        Ok(Self::new(longest / target_size as usize))
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// `ceil(n / step)` on each axis; a partial final stride still yields a sample
    pub fn output_dimensions(&self, dims: Dimensions) -> Dimensions {
        Dimensions::new(dims.width.div_ceil(self.step), dims.height.div_ceil(self.step))
    }
}

/// Maps a sample into 0..=255 using `round((v - min) * 256 / (max - min + 1))`
///
/// The `+ 1` keeps constant bands finite (they map to 0) and lets the top
/// of the range round to 256, so results are clamped. NaN maps to 0.
pub fn stretch_value(value: f64, stats: &BandStats) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let scaled = (value - stats.min) * 256.0 / (stats.max - stats.min + 1.0);
    scaled.round().clamp(0.0, 255.0) as u8
}

/// Samples every `step`-th row and column of each selected band and
/// stretches them into a new [`EncodedImage`]
pub fn resample_and_stretch<S>(
    source: &mut S,
    selection: &BandSelection,
    stats: &[BandStats],
    stride: DecimationStride,
) -> Result<EncodedImage>
where
    S: RasterSource + ?Sized,
{
    if stats.len() != selection.len() {
        return Err(Error::InvalidBandSelection(format!(
            "{} bands selected but {} statistics supplied",
            selection.len(),
            stats.len()
        )));
    }

    let dims = source.dimensions();
    let out = stride.output_dimensions(dims);
    let step = stride.step();

    let mut image = EncodedImage::new(out.width, out.height, selection.len());
    let mut scratch = Vec::with_capacity(dims.width);
    let mut sampled = Vec::with_capacity(out.width);
    let mut encoded = vec![0u8; out.width];

    for (dst_row, src_row) in (0..dims.height).step_by(step).enumerate() {
        for (slot, (band, band_stats)) in selection.zero_based().zip(stats).enumerate() {
            source.read_row_strided(band, src_row, step, &mut scratch, &mut sampled)?;
            for (dst, &value) in encoded.iter_mut().zip(&sampled) {
                *dst = stretch_value(value, band_stats);
            }
            image.write_row(slot, dst_row, &encoded)?;
        }
    }

    log::debug!(
        "Resampled {}x{} to {}x{} with step {}",
        dims.width,
        dims.height,
        out.width,
        out.height,
        step
    );

    Ok(image)
}
