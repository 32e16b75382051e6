//! Raster dataset abstraction consumed by the thumbnail pipeline
//!
//! A [`RasterSource`] is an open, exclusively owned raster handle. It is
//! released when dropped; the pipeline never keeps one past a call.

pub mod memory;
#[cfg(test)]
pub(crate) mod counting;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use crate::config::ThumbnailConfig;
use crate::error::{Error, Result};
use crate::formats::tiff::{self, TiffRaster};
use crate::types::Dimensions;

pub use memory::MemoryRaster;

/// Row-oriented read access to a multi-band raster
///
/// Band indices here are zero-based; one-based indices only appear in
/// [`BandSelection`](crate::thumbnail::BandSelection).
pub trait RasterSource {
    /// Number of bands
    fn band_count(&self) -> usize;

    /// Width (`nCols`) and height (`nRows`)
    fn dimensions(&self) -> Dimensions;

    /// Reads row `row` of `band` into `buf`, which holds at least `width` values
    fn read_row(&mut self, band: usize, row: usize, buf: &mut [f64]) -> Result<()>;

    /// Reads every `step`-th column of a row, starting at column 0
    ///
    /// `scratch` is a reusable full-width buffer; `out` receives
    /// `ceil(width / step)` values.
    fn read_row_strided(
        &mut self,
        band: usize,
        row: usize,
        step: usize,
        scratch: &mut Vec<f64>,
        out: &mut Vec<f64>,
    ) -> Result<()> {
        scratch.resize(self.dimensions().width, 0.0);
        self.read_row(band, row, scratch)?;
        out.clear();
        out.extend(scratch.iter().step_by(step.max(1)).copied());
        Ok(())
    }
}

impl<T: RasterSource + ?Sized> RasterSource for Box<T> {
    fn band_count(&self) -> usize {
        (**self).band_count()
    }

    fn dimensions(&self) -> Dimensions {
        (**self).dimensions()
    }

    fn read_row(&mut self, band: usize, row: usize, buf: &mut [f64]) -> Result<()> {
        (**self).read_row(band, row, buf)
    }

    fn read_row_strided(
        &mut self,
        band: usize,
        row: usize,
        step: usize,
        scratch: &mut Vec<f64>,
        out: &mut Vec<f64>,
    ) -> Result<()> {
        (**self).read_row_strided(band, row, step, scratch, out)
    }
}

impl<T: RasterSource + ?Sized> RasterSource for &mut T {
    fn band_count(&self) -> usize {
        (**self).band_count()
    }

    fn dimensions(&self) -> Dimensions {
        (**self).dimensions()
    }

    fn read_row(&mut self, band: usize, row: usize, buf: &mut [f64]) -> Result<()> {
        (**self).read_row(band, row, buf)
    }

    fn read_row_strided(
        &mut self,
        band: usize,
        row: usize,
        step: usize,
        scratch: &mut Vec<f64>,
        out: &mut Vec<f64>,
    ) -> Result<()> {
        (**self).read_row_strided(band, row, step, scratch, out)
    }
}

/// Validates a row request against a raster's shape
pub(crate) fn check_row_request(
    dims: Dimensions,
    band_count: usize,
    band: usize,
    row: usize,
    buf_len: usize,
) -> Result<()> {
    if band >= band_count {
        return Err(Error::OutOfBounds(format!(
            "Band index {} outside {} bands",
            band, band_count
        )));
    }
    if row >= dims.height {
        return Err(Error::OutOfBounds(format!(
            "Row {} outside raster height {}",
            row, dims.height
        )));
    }
    if buf_len < dims.width {
        return Err(Error::OutOfBounds(format!(
            "Row buffer of {} values for raster width {}",
            buf_len, dims.width
        )));
    }
    Ok(())
}

/// Opens a raster file, choosing the reader from the file header
///
/// TIFF and BigTIFF are read natively with block caching; other formats
/// the `image` crate recognizes are decoded into a [`MemoryRaster`].
pub fn open_raster<P: AsRef<Path>>(path: P, config: &ThumbnailConfig) -> Result<Box<dyn RasterSource>> {
    let path = path.as_ref();

    let mut header = Vec::with_capacity(4);
    File::open(path)?.take(4).read_to_end(&mut header)?;

    if tiff::is_tiff_header(&header) {
        log::debug!("Opening {} with the TIFF reader", path.display());
        let raster = TiffRaster::open_with_options(path, config.use_mmap, config.block_cache_size)?;
        return Ok(Box::new(raster));
    }

    log::debug!("Opening {} through the image decoder", path.display());
    let image = image::open(path)?;
    Ok(Box::new(MemoryRaster::from_image(&image)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_row_request() {
        let dims = Dimensions::new(4, 3);
        assert!(check_row_request(dims, 2, 1, 2, 4).is_ok());
        assert!(check_row_request(dims, 2, 2, 0, 4).is_err());
        assert!(check_row_request(dims, 2, 0, 3, 4).is_err());
        assert!(check_row_request(dims, 2, 0, 0, 3).is_err());
    }

    #[test]
    fn test_default_strided_read() {
        let mut raster = MemoryRaster::from_fn(7, 2, 1, |_, x, y| (y * 10 + x) as f64);
        let (mut scratch, mut out) = (Vec::new(), Vec::new());

        raster.read_row_strided(0, 1, 3, &mut scratch, &mut out).unwrap();
        assert_eq!(out, vec![10.0, 13.0, 16.0]);
    }

    #[test]
    fn test_open_raster_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        image::RgbImage::from_pixel(5, 4, image::Rgb([10, 20, 30])).save(&path).unwrap();

        let mut raster = open_raster(&path, &ThumbnailConfig::default()).unwrap();
        assert_eq!(raster.band_count(), 3);
        assert_eq!(raster.dimensions(), Dimensions::new(5, 4));

        let mut row = vec![0.0; 5];
        raster.read_row(2, 3, &mut row).unwrap();
        assert_eq!(row, vec![30.0; 5]);
    }

    #[test]
    fn test_open_raster_missing_file() {
        let result = open_raster("/nonexistent/raster.tif", &ThumbnailConfig::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
