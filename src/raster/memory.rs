//! In-memory raster

use image::DynamicImage;
use crate::error::{Error, Result};
use crate::types::Dimensions;
use super::{check_row_request, RasterSource};

/// A band-major raster held in memory
///
/// Backs decoded PNG/JPEG/BMP/GIF inputs and synthetic rasters in tests.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    dimensions: Dimensions,
    bands: Vec<Vec<f64>>,
}

impl MemoryRaster {
    /// Creates a raster from one `width * height` buffer per band
    pub fn new(width: usize, height: usize, bands: Vec<Vec<f64>>) -> Result<Self> {
        if bands.is_empty() {
            return Err(Error::InvalidFormat("Raster needs at least one band".to_string()));
        }

        let expected = width * height;
        if let Some((index, band)) = bands.iter().enumerate().find(|(_, b)| b.len() != expected) {
            return Err(Error::InvalidFormat(format!(
                "Band {} has {} values, expected {}",
                index + 1,
                band.len(),
                expected
            )));
        }

        Ok(Self {
            dimensions: Dimensions::new(width, height),
            bands,
        })
    }

    /// Builds a raster by evaluating `value(band, x, y)` for every sample
    pub fn from_fn<F>(width: usize, height: usize, band_count: usize, value: F) -> Self
    where
        F: Fn(usize, usize, usize) -> f64,
    {
        let bands = (0..band_count)
            .map(|band| {
                (0..height)
                    .flat_map(|y| (0..width).map(move |x| (x, y)))
                    .map(|(x, y)| value(band, x, y))
                    .collect()
            })
            .collect();

        Self {
            dimensions: Dimensions::new(width, height),
            bands,
        }
    }

    /// A raster where every sample of every band equals `value`
    pub fn filled(width: usize, height: usize, band_count: usize, value: f64) -> Self {
        Self::from_fn(width, height, band_count, |_, _, _| value)
    }

    /// Splits a decoded image into one band per channel
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let channels = image.color().channel_count() as usize;

        let bands = match image {
            DynamicImage::ImageLuma8(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageLumaA8(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageRgb8(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageRgba8(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageLuma16(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageLumaA16(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageRgb16(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageRgba16(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageRgb32F(img) => deinterleave(img.as_raw(), channels),
            DynamicImage::ImageRgba32F(img) => deinterleave(img.as_raw(), channels),
            other => deinterleave(other.to_rgba8().as_raw(), 4),
        };

        Self::new(width, height, bands)
    }

    pub fn band(&self, band: usize) -> Option<&[f64]> {
        self.bands.get(band).map(Vec::as_slice)
    }
}

fn deinterleave<T: Copy + Into<f64>>(samples: &[T], channels: usize) -> Vec<Vec<f64>> {
    (0..channels)
        .map(|c| {
            samples
                .iter()
                .skip(c)
                .step_by(channels)
                .map(|&s| s.into())
                .collect()
        })
        .collect()
}

impl RasterSource for MemoryRaster {
    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn read_row(&mut self, band: usize, row: usize, buf: &mut [f64]) -> Result<()> {
        check_row_request(self.dimensions, self.bands.len(), band, row, buf.len())?;
        let width = self.dimensions.width;
        buf[..width].copy_from_slice(&self.bands[band][row * width..(row + 1) * width]);
        Ok(())
    }

    fn read_row_strided(
        &mut self,
        band: usize,
        row: usize,
        step: usize,
        _scratch: &mut Vec<f64>,
        out: &mut Vec<f64>,
    ) -> Result<()> {
        let width = self.dimensions.width;
        check_row_request(self.dimensions, self.bands.len(), band, row, width)?;
        out.clear();
        out.extend(
            self.bands[band][row * width..(row + 1) * width]
                .iter()
                .step_by(step.max(1))
                .copied(),
        );
        Ok(())
    }
}
