//! Error types for the thumbnailer

use std::io;

/// Result type for thumbnailer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading rasters or producing thumbnails
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed raster container
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid byte order marker
    #[error("Invalid byte order: 0x{0:04X}")]
    InvalidByteOrder(u16),

    /// Invalid TIFF magic number
    #[error("Invalid TIFF magic number: {0}")]
    InvalidMagic(u16),

    /// Missing required tag
    #[error("Missing required tag: {0}")]
    MissingTag(u16),

    /// Unsupported feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Band selection has a length other than 1 or 3, or contains index 0
    #[error("Invalid band selection: {0}")]
    InvalidBandSelection(String),

    /// One-based band index beyond the raster's band count
    #[error("Band {band} out of range (raster has {band_count} bands)")]
    BandOutOfRange { band: usize, band_count: usize },

    /// Output format token or extension outside the supported set
    #[error("Unsupported output format: {0}")]
    UnsupportedOutputFormat(String),

    /// Non-positive target size or percentage, or an empty raster
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Encoding or decoding failure in the image driver
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Config(error.to_string())
    }
}
