//! Band selection

use crate::error::{Error, Result};

/// An ordered list of one-based band indices: one for grayscale, three for RGB
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSelection {
    indices: Vec<usize>,
}

impl BandSelection {
    /// Validates the selection's shape; band count is checked separately
    pub fn new(indices: &[usize]) -> Result<Self> {
        if !matches!(indices.len(), 1 | 3) {
            return Err(Error::InvalidBandSelection(format!(
                "expected 1 or 3 bands, got {}",
                indices.len()
            )));
        }
        if indices.contains(&0) {
            return Err(Error::InvalidBandSelection(
                "band indices are one-based".to_string(),
            ));
        }

        Ok(Self {
            indices: indices.to_vec(),
        })
    }

    /// Bands 1, 2, 3 when available, otherwise band 1
    pub fn automatic(band_count: usize) -> Self {
        let indices = if band_count >= 3 { vec![1, 2, 3] } else { vec![1] };
        Self { indices }
    }

    /// Checks every index against the raster's band count
    pub fn validate_against(&self, band_count: usize) -> Result<()> {
        match self.indices.iter().find(|&&band| band > band_count) {
            Some(&band) => Err(Error::BandOutOfRange { band, band_count }),
            None => Ok(()),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Zero-based indices as used by [`RasterSource`](crate::raster::RasterSource)
    pub fn zero_based(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().map(|&band| band - 1)
    }
}
