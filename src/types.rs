//! Core data types shared by raster sources and the thumbnail pipeline

use crate::error::{Error, Result};
use crate::io::ByteOrder;

/// Represents pixel sample types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl DataType {
    /// Resolves a sample type from TIFF `BitsPerSample` and `SampleFormat`
    ///
    /// Sample format 1 is unsigned, 2 is signed, 3 is IEEE float.
    pub fn from_tiff(bits_per_sample: u64, sample_format: u64) -> Result<Self> {
        match (sample_format, bits_per_sample) {
            (1, 8) => Ok(DataType::U8),
            (1, 16) => Ok(DataType::U16),
            (1, 32) => Ok(DataType::U32),
            (2, 8) => Ok(DataType::I8),
            (2, 16) => Ok(DataType::I16),
            (2, 32) => Ok(DataType::I32),
            (3, 32) => Ok(DataType::F32),
            (3, 64) => Ok(DataType::F64),
            _ => Err(Error::Unsupported(format!(
                "{} bits per sample with sample format {}",
                bits_per_sample, sample_format
            ))),
        }
    }

    /// Returns the size in bytes for this data type
    pub fn size(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::F64 => 8,
        }
    }

    /// Returns the name of this data type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::U8 => "U8",
            DataType::U16 => "U16",
            DataType::U32 => "U32",
            DataType::I8 => "I8",
            DataType::I16 => "I16",
            DataType::I32 => "I32",
            DataType::F32 => "F32",
            DataType::F64 => "F64",
        }
    }

    /// Whether the type is an integer type that the horizontal predictor applies to
    pub fn is_integer(&self) -> bool {
        !matches!(self, DataType::F32 | DataType::F64)
    }

    /// Decodes one sample from the start of `bytes`
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> Result<f64> {
        Ok(match self {
            DataType::U8 => *bytes.first().ok_or_else(short_sample)? as f64,
            DataType::I8 => *bytes.first().ok_or_else(short_sample)? as i8 as f64,
            DataType::U16 => order.u16(bytes)? as f64,
            DataType::I16 => order.u16(bytes)? as i16 as f64,
            DataType::U32 => order.u32(bytes)? as f64,
            DataType::I32 => order.u32(bytes)? as i32 as f64,
            DataType::F32 => f32::from_bits(order.u32(bytes)?) as f64,
            DataType::F64 => f64::from_bits(order.u64(bytes)?),
        })
    }
}

fn short_sample() -> Error {
    Error::OutOfBounds("Sample truncated".to_string())
}

/// Raster dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl Dimensions {
    /// Creates new dimensions
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
