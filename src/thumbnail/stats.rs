//! Per-band min/max scan

use crate::error::Result;
use crate::raster::RasterSource;
use super::BandSelection;

/// Value range of one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStats {
    pub min: f64,
    pub max: f64,
}

impl BandStats {
    fn include(self, value: f64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }
}

/// Reads every row of each selected band once and returns their ranges
///
/// The range starts at the first sample rather than at +/- infinity, so a
/// constant band reports `min == max`. NaN samples are ignored; a band with
/// nothing else reports `{0, 0}`. The first failed read aborts the scan.
pub fn scan_band_statistics<S>(source: &mut S, selection: &BandSelection) -> Result<Vec<BandStats>>
where
    S: RasterSource + ?Sized,
{
    let dims = source.dimensions();
    let mut row = vec![0.0; dims.width];
    let mut stats = Vec::with_capacity(selection.len());

    for band in selection.zero_based() {
        let mut range: Option<BandStats> = None;

        for y in 0..dims.height {
            source.read_row(band, y, &mut row)?;
            for &value in row.iter().filter(|v| !v.is_nan()) {
                range = Some(match range {
                    None => BandStats { min: value, max: value },
                    Some(current) => current.include(value),
                });
            }
        }

        let range = range.unwrap_or(BandStats { min: 0.0, max: 0.0 });
        log::debug!("Band {}: min {} max {}", band + 1, range.min, range.max);
        stats.push(range);
    }

    Ok(stats)
}
