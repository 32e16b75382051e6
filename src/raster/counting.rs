//! Row-read accounting for tests

use crate::error::{Error, Result};
use crate::types::Dimensions;
use super::RasterSource;

/// Wraps a source, counting `read_row` calls and optionally failing after a limit
pub(crate) struct CountingRaster<S> {
    inner: S,
    pub rows_read: usize,
    fail_after: Option<usize>,
}

impl<S: RasterSource> CountingRaster<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            rows_read: 0,
            fail_after: None,
        }
    }

    /// Fails every read once `limit` rows have been read
    pub fn failing_after(inner: S, limit: usize) -> Self {
        Self {
            fail_after: Some(limit),
            ..Self::new(inner)
        }
    }
}

impl<S: RasterSource> RasterSource for CountingRaster<S> {
    fn band_count(&self) -> usize {
        self.inner.band_count()
    }

    fn dimensions(&self) -> Dimensions {
        self.inner.dimensions()
    }

    fn read_row(&mut self, band: usize, row: usize, buf: &mut [f64]) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.rows_read >= limit) {
            return Err(Error::InvalidFormat(format!("read limit hit at row {}", row)));
        }
        self.rows_read += 1;
        self.inner.read_row(band, row, buf)
    }
}
