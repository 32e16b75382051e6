//! Output container formats

use std::io::Cursor;
use std::path::Path;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use crate::error::{Error, Result};

/// Thumbnail output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Bmp,
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    /// Parses a format token such as `"PNG"` or `"jpg"`, ignoring case
    pub fn from_token(token: &str) -> Result<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "BMP" => Ok(OutputFormat::Bmp),
            "JPEG" | "JPG" => Ok(OutputFormat::Jpeg),
            "PNG" => Ok(OutputFormat::Png),
            "GIF" => Ok(OutputFormat::Gif),
            _ => Err(Error::UnsupportedOutputFormat(token.to_string())),
        }
    }

    /// Picks the format from a destination path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::UnsupportedOutputFormat(path.display().to_string()))?;
        Self::from_token(extension)
    }

    /// Canonical upper-case token
    pub fn token(&self) -> &'static str {
        match self {
            OutputFormat::Bmp => "BMP",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::Gif => "GIF",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Gif => ImageFormat::Gif,
        }
    }

    /// Whether the container can carry an alpha channel the pipeline fills in
    pub fn supports_transparency(&self) -> bool {
        matches!(self, OutputFormat::Png)
    }

    /// Encodes `image` into an in-memory buffer of this format
    ///
    /// JPEG drops alpha (grayscale stays single channel); GIF is always
    /// written from RGBA.
    pub fn encode(&self, image: &DynamicImage, jpeg_quality: u8) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());

        match self {
            OutputFormat::Jpeg => {
                let flattened = if image.color().has_color() {
                    DynamicImage::ImageRgb8(image.to_rgb8())
                } else {
                    DynamicImage::ImageLuma8(image.to_luma8())
                };
                let encoder = JpegEncoder::new_with_quality(&mut cursor, jpeg_quality.clamp(1, 100));
                flattened.write_with_encoder(encoder)?;
            }
            OutputFormat::Gif => {
                DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut cursor, ImageFormat::Gif)?;
            }
            OutputFormat::Bmp | OutputFormat::Png => {
                image.write_to(&mut cursor, self.image_format())?;
            }
        }

        Ok(cursor.into_inner())
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s)
    }
}
