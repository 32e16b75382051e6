//! Strip and tile geometry of the main image

use std::fmt;
use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::types::{DataType, Dimensions};
use super::{tags, IFD};

/// How samples are arranged in the stored blocks of an image
#[derive(Debug, Clone)]
pub struct BlockLayout {
    pub dimensions: Dimensions,
    pub data_type: DataType,
    pub samples_per_pixel: usize,
    /// Planar configuration 2: one set of blocks per band
    pub separate_planes: bool,
    pub block_width: usize,
    pub block_height: usize,
    pub blocks_across: usize,
    pub blocks_down: usize,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
    pub compression: Compression,
    pub predictor: u64,
    pub tiled: bool,
}

fn required(ifd: &IFD, tag: u16) -> Result<u64> {
    ifd.get_u64(tag).ok_or(Error::MissingTag(tag))
}

/// A per-sample tag must carry the same value for every band
fn uniform(ifd: &IFD, tag: u16, default: u64) -> Result<u64> {
    match ifd.get_values(tag) {
        None | Some([]) => Ok(default),
        Some([first, rest @ ..]) => {
            if rest.iter().any(|v| v != first) {
                return Err(Error::Unsupported(format!(
                    "Mixed {} values across bands",
                    tags::tag_name(tag)
                )));
            }
            Ok(*first)
        }
    }
}

impl BlockLayout {
    /// Derives the layout from the main IFD
    pub fn from_ifd(ifd: &IFD) -> Result<Self> {
        let width = required(ifd, tags::IMAGE_WIDTH)? as usize;
        let height = required(ifd, tags::IMAGE_LENGTH)? as usize;
        let samples_per_pixel = ifd.get_u64(tags::SAMPLES_PER_PIXEL).unwrap_or(1).max(1) as usize;

        let bits = uniform(ifd, tags::BITS_PER_SAMPLE, 1)?;
        let sample_format = uniform(ifd, tags::SAMPLE_FORMAT, 1)?;
        let data_type = DataType::from_tiff(bits, sample_format)?;

        let separate_planes = match ifd.get_u64(tags::PLANAR_CONFIGURATION).unwrap_or(1) {
            1 => false,
            2 => true,
            other => {
                return Err(Error::InvalidFormat(format!(
                    "Planar configuration {}",
                    other
                )))
            }
        };

        let compression = Compression::from_tag(ifd.get_u64(tags::COMPRESSION).unwrap_or(1))?;
        let predictor = ifd.get_u64(tags::PREDICTOR).unwrap_or(1);
        match predictor {
            1 => {}
            2 if data_type.is_integer() => {}
            _ => {
                return Err(Error::Unsupported(format!(
                    "Predictor {} for {} samples",
                    predictor,
                    data_type.name()
                )))
            }
        }

        let tiled = ifd.is_tiled();
        let (block_width, block_height, offsets_tag, counts_tag) = if tiled {
            (
                required(ifd, tags::TILE_WIDTH)? as usize,
                required(ifd, tags::TILE_LENGTH)? as usize,
                tags::TILE_OFFSETS,
                tags::TILE_BYTE_COUNTS,
            )
        } else {
            let rows_per_strip = ifd
                .get_u64(tags::ROWS_PER_STRIP)
                .map(|r| (r as usize).min(height))
                .unwrap_or(height);
            (width, rows_per_strip, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };

        if block_width == 0 || block_height == 0 {
            return Err(Error::InvalidFormat("Zero-sized blocks".to_string()));
        }

        let offsets = ifd.get_values(offsets_tag).ok_or(Error::MissingTag(offsets_tag))?.to_vec();
        let byte_counts = ifd.get_values(counts_tag).ok_or(Error::MissingTag(counts_tag))?.to_vec();

        let layout = Self {
            dimensions: Dimensions::new(width, height),
            data_type,
            samples_per_pixel,
            separate_planes,
            block_width,
            block_height,
            blocks_across: width.div_ceil(block_width),
            blocks_down: height.div_ceil(block_height),
            offsets,
            byte_counts,
            compression,
            predictor,
            tiled,
        };

        let expected = layout.block_count();
        if layout.offsets.len() < expected || layout.byte_counts.len() < expected {
            return Err(Error::InvalidFormat(format!(
                "Expected {} blocks, found {} offsets and {} byte counts",
                expected,
                layout.offsets.len(),
                layout.byte_counts.len()
            )));
        }

        Ok(layout)
    }

    /// Number of stored blocks across all planes
    pub fn block_count(&self) -> usize {
        let per_plane = self.blocks_across * self.blocks_down;
        if self.separate_planes {
            per_plane * self.samples_per_pixel
        } else {
            per_plane
        }
    }

    /// Samples stored per pixel inside one block
    pub fn samples_per_block_pixel(&self) -> usize {
        if self.separate_planes {
            1
        } else {
            self.samples_per_pixel
        }
    }

    /// Byte length of one decoded row of a block
    pub fn block_row_bytes(&self) -> usize {
        self.block_width * self.samples_per_block_pixel() * self.data_type.size()
    }

    /// Byte length of a fully populated decoded block
    pub fn block_bytes(&self) -> usize {
        self.block_row_bytes() * self.block_height
    }

    /// Index of the block holding `band` at block grid position (`block_row`, `block_col`)
    pub fn block_index(&self, band: usize, block_row: usize, block_col: usize) -> usize {
        let within_plane = block_row * self.blocks_across + block_col;
        if self.separate_planes {
            band * self.blocks_across * self.blocks_down + within_plane
        } else {
            within_plane
        }
    }

    /// Byte offset of a sample inside a decoded block
    pub fn sample_offset(&self, band: usize, x: usize, y: usize) -> usize {
        let spb = self.samples_per_block_pixel();
        let sample = if self.separate_planes { 0 } else { band };
        (y * self.block_width * spb + x * spb + sample) * self.data_type.size()
    }
}

impl fmt::Display for BlockLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Dimensions: {} x {}", self.dimensions.width, self.dimensions.height)?;
        writeln!(f, "  Bands: {}", self.samples_per_pixel)?;
        writeln!(f, "  Data type: {}", self.data_type.name())?;
        writeln!(
            f,
            "  {}: {} x {} ({} blocks)",
            if self.tiled { "Tiles" } else { "Strips" },
            self.block_width,
            self.block_height,
            self.block_count()
        )?;
        writeln!(
            f,
            "  Planar: {}",
            if self.separate_planes { "separate" } else { "chunky" }
        )?;
        write!(f, "  Compression: {}", self.compression.name())
    }
}
