//! TIFF-backed raster source with decoded-block caching

use std::path::Path;
use std::sync::Arc;
use crate::cache::BlockCache;
use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::raster::{check_row_request, RasterSource};
use crate::types::Dimensions;
use super::{BlockLayout, TiffReader};

/// Undoes horizontal differencing (predictor 2) in place
///
/// Each sample is stored as the difference from the same band's sample one
/// pixel to the left, row by row.
fn undo_horizontal_predictor(
    data: &mut [u8],
    row_bytes: usize,
    samples_per_pixel: usize,
    sample_size: usize,
    order: ByteOrder,
) -> Result<()> {
    let pixel_bytes = samples_per_pixel * sample_size;

    for row in data.chunks_exact_mut(row_bytes) {
        if sample_size == 1 {
            for i in pixel_bytes..row.len() {
                row[i] = row[i].wrapping_add(row[i - pixel_bytes]);
            }
            continue;
        }

        for offset in (pixel_bytes..row.len()).step_by(sample_size) {
            let left = order.uint(&row[offset - pixel_bytes..], sample_size)?;
            let delta = order.uint(&row[offset..], sample_size)?;
            order.put_uint(&mut row[offset..], left.wrapping_add(delta), sample_size);
        }
    }

    Ok(())
}

/// A TIFF or BigTIFF main image exposed as a [`RasterSource`]
pub struct TiffRaster {
    reader: TiffReader,
    layout: BlockLayout,
    cache: BlockCache,
}

impl TiffRaster {
    /// Opens a TIFF with memory mapping and the default cache size
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, true, 256)
    }

    /// Opens a TIFF file
    ///
    /// # Arguments
    /// * `path` - Path to the TIFF file
    /// * `use_mmap` - Whether to memory map the file
    /// * `cache_size` - Number of decoded blocks to keep
    pub fn open_with_options<P: AsRef<Path>>(path: P, use_mmap: bool, cache_size: usize) -> Result<Self> {
        let reader = TiffReader::open_with_options(path, use_mmap)?;
        Self::from_reader(reader, cache_size)
    }

    pub fn from_reader(mut reader: TiffReader, cache_size: usize) -> Result<Self> {
        let ifd = reader.read_main_ifd()?;
        let layout = BlockLayout::from_ifd(&ifd)?;

        Ok(Self {
            reader,
            layout,
            cache: BlockCache::new(cache_size),
        })
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// Returns a decoded block, loading it on a cache miss
    fn block(&mut self, index: usize) -> Result<Arc<Vec<u8>>> {
        if let Some(data) = self.cache.get(index) {
            return Ok(data);
        }

        let decoded = self.load_block(index)?;
        Ok(self.cache.insert(index, decoded))
    }

    fn load_block(&mut self, index: usize) -> Result<Vec<u8>> {
        let layout = &self.layout;
        let expected_len = layout.block_bytes();
        let byte_count = layout.byte_counts[index];

        if byte_count == 0 {
            return Ok(vec![0u8; expected_len]);
        }

        let stored = self.reader.read_at(layout.offsets[index], byte_count as usize)?;
        let mut decoded = layout.compression.decompress(&stored, expected_len)?;

        if layout.predictor == 2 {
            undo_horizontal_predictor(
                &mut decoded,
                layout.block_row_bytes(),
                layout.samples_per_block_pixel(),
                layout.data_type.size(),
                self.reader.byte_order(),
            )?;
        }

        Ok(decoded)
    }
}

impl RasterSource for TiffRaster {
    fn band_count(&self) -> usize {
        self.layout.samples_per_pixel
    }

    fn dimensions(&self) -> Dimensions {
        self.layout.dimensions
    }

    fn read_row(&mut self, band: usize, row: usize, buf: &mut [f64]) -> Result<()> {
        check_row_request(self.dimensions(), self.band_count(), band, row, buf.len())?;

        let block_row = row / self.layout.block_height;
        let y = row % self.layout.block_height;
        let width = self.layout.dimensions.width;
        let sample_size = self.layout.data_type.size();
        let order = self.reader.byte_order();

        for block_col in 0..self.layout.blocks_across {
            let index = self.layout.block_index(band, block_row, block_col);
            let block = self.block(index)?;

            let x0 = block_col * self.layout.block_width;
            let columns = self.layout.block_width.min(width - x0);

            for x in 0..columns {
                let offset = self.layout.sample_offset(band, x, y);
                let sample = block.get(offset..offset + sample_size).ok_or_else(|| {
                    Error::OutOfBounds(format!(
                        "Block {} holds {} bytes, sample at {} needed",
                        index,
                        block.len(),
                        offset
                    ))
                })?;
                buf[x0 + x] = self.layout.data_type.decode(sample, order)?;
            }
        }

        Ok(())
    }
}
