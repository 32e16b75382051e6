//! 8-bit intermediate image

use image::{DynamicImage, GrayImage, RgbImage};
use crate::error::{Error, Result};

/// Pixel-interleaved 8-bit raster produced by the stretch pass
///
/// Holds one band (grayscale) or three (RGB). Rows are written one band at
/// a time, mirroring how the source raster is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    width: usize,
    height: usize,
    bands: usize,
    data: Vec<u8>,
}

impl EncodedImage {
    /// A zeroed image
    pub fn new(width: usize, height: usize, bands: usize) -> Self {
        Self {
            width,
            height,
            bands,
            data: vec![0; width * height * bands],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Interleaved samples, `bands` bytes per pixel
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Writes one row of one band
    pub fn write_row(&mut self, band: usize, row: usize, values: &[u8]) -> Result<()> {
        if band >= self.bands || row >= self.height || values.len() != self.width {
            return Err(Error::OutOfBounds(format!(
                "Row write band {} row {} with {} values into {}x{}x{}",
                band,
                row,
                values.len(),
                self.width,
                self.height,
                self.bands
            )));
        }

        let start = row * self.width * self.bands;
        let row_data = &mut self.data[start..start + self.width * self.bands];
        for (pixel, &value) in row_data.chunks_exact_mut(self.bands).zip(values) {
            pixel[band] = value;
        }
        Ok(())
    }

    /// Samples of the pixel at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.bands;
        Some(&self.data[start..start + self.bands])
    }

    /// Converts to an `image` buffer: `L8` for one band, `Rgb8` for three
    pub fn to_dynamic_image(&self) -> Result<DynamicImage> {
        let (width, height) = (to_u32(self.width)?, to_u32(self.height)?);
        let data = self.data.clone();

        let image = match self.bands {
            1 => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            n => {
                return Err(Error::Unsupported(format!(
                    "{}-band intermediate image",
                    n
                )))
            }
        };

        image.ok_or_else(|| Error::InvalidFormat("Image buffer size mismatch".to_string()))
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::OutOfBounds(format!("Image side {} too large", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_row_interleaves_bands() {
        let mut image = EncodedImage::new(2, 1, 3);
        image.write_row(0, 0, &[1, 2]).unwrap();
        image.write_row(2, 0, &[9, 8]).unwrap();

        assert_eq!(image.data(), &[1, 0, 9, 2, 0, 8]);
        assert_eq!(image.pixel(1, 0), Some(&[2, 0, 8][..]));
    }

    #[test]
    fn test_write_row_bounds() {
        let mut image = EncodedImage::new(2, 2, 1);
        assert!(image.write_row(1, 0, &[0, 0]).is_err());
        assert!(image.write_row(0, 2, &[0, 0]).is_err());
        assert!(image.write_row(0, 0, &[0]).is_err());
    }

    #[test]
    fn test_to_dynamic_image() {
        let gray = EncodedImage::new(3, 2, 1).to_dynamic_image().unwrap();
        assert_eq!(gray.color(), image::ColorType::L8);
        assert_eq!((gray.width(), gray.height()), (3, 2));

        let rgb = EncodedImage::new(1, 1, 3).to_dynamic_image().unwrap();
        assert_eq!(rgb.color(), image::ColorType::Rgb8);

        assert!(EncodedImage::new(1, 1, 2).to_dynamic_image().is_err());
    }
}
