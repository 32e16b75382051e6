//! Block codecs for raster containers
//!
//! Each codec turns one stored strip or tile into its raw sample bytes.

pub mod deflate;
pub mod lzw;
pub mod packbits;

use crate::error::{Error, Result};

/// Compression schemes understood by the TIFF raster reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Deflate/ZIP compression (Adobe and legacy tag values)
    Deflate,
    /// LZW compression
    Lzw,
    /// PackBits compression
    PackBits,
    /// JPEG compression (TIFF 6.0 technote 2 style)
    Jpeg,
}

impl Compression {
    /// Creates compression from TIFF compression tag value
    pub fn from_tag(value: u64) -> Result<Self> {
        match value {
            1 => Ok(Compression::None),
            5 => Ok(Compression::Lzw),
            7 => Ok(Compression::Jpeg),
            8 | 32946 => Ok(Compression::Deflate),
            32773 => Ok(Compression::PackBits),
            _ => Err(Error::Unsupported(format!("Compression type {}", value))),
        }
    }

    /// Returns the name of this compression type
    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "None",
            Compression::Deflate => "Deflate/ZIP",
            Compression::Lzw => "LZW",
            Compression::PackBits => "PackBits",
            Compression::Jpeg => "JPEG",
        }
    }

    /// Decodes one stored block
    ///
    /// `expected_len` is the size of a fully populated block; codecs use it
    /// to pre-size their output and to stop early on padded streams.
    pub fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Deflate => deflate::decompress(data, expected_len),
            Compression::Lzw => lzw::decompress(data, expected_len),
            Compression::PackBits => packbits::decompress(data, expected_len),
            Compression::Jpeg => {
                let mut decoder = jpeg_decoder::Decoder::new(data);
                decoder
                    .decode()
                    .map_err(|e| Error::InvalidFormat(format!("JPEG error: {}", e)))
            }
        }
    }
}
