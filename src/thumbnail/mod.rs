//! Thumbnail generation
//!
//! Two paths produce a small preview of a raster:
//!
//! - The stretch path ([`ThumbnailPipeline::create_thumbnail`]) scans each
//!   selected band for its range, samples rows and columns at a fixed
//!   stride, maps samples linearly to 8 bits and writes BMP, JPEG, PNG or
//!   GIF. PNG output additionally gets the dominant border color keyed out
//!   as transparent.
//! - The percentage path ([`ThumbnailPipeline::truecolor_thumbnail`])
//!   saturates samples to 8 bits and resizes by a percentage into a PNG.
//!
//! Every call opens its own raster handle and drops it before returning.

pub mod band;
pub mod border;
pub mod encoded;
pub mod format;
pub mod stats;
pub mod stretch;
pub mod transparency;
pub mod truecolor;

use std::fs;
use std::io::Write;
use std::path::Path;
use image::DynamicImage;
use tempfile::NamedTempFile;
use crate::config::ThumbnailConfig;
use crate::error::{Error, Result};
use crate::raster::{open_raster, RasterSource};

pub use band::BandSelection;
pub use border::detect_border_nodata;
pub use encoded::EncodedImage;
pub use format::OutputFormat;
pub use stats::{scan_band_statistics, BandStats};
pub use stretch::{resample_and_stretch, stretch_value, DecimationStride};
pub use transparency::mask_nodata;
pub use truecolor::composite_thumbnail;

/// Pipeline stages, in the order they can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Opened,
    StatsComputed,
    ResampledEncoded,
    /// Only when the output is not BMP
    FormatConverted,
    /// Only for PNG output
    TransparencyApplied,
    Closed,
}

/// Summary of a completed stretch-path call
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailReport {
    pub format: OutputFormat,
    pub width: usize,
    pub height: usize,
    pub bands: usize,
    pub step: usize,
    pub stats: Vec<BandStats>,
    /// Border color keyed out as transparent, as `0xRRGGBB`
    pub nodata: Option<u32>,
    pub stages: Vec<Stage>,
}

/// Stretch-path result before any container encoding
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    pub image: EncodedImage,
    pub stats: Vec<BandStats>,
    pub stride: DecimationStride,
}

/// Produces thumbnails from raster files
#[derive(Debug, Clone, Default)]
pub struct ThumbnailPipeline {
    config: ThumbnailConfig,
}

impl ThumbnailPipeline {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    /// Writes a stretched thumbnail of `bands` (one-based, 1 or 3 of them)
    /// fitting in a `target_size` square
    ///
    /// The band list is checked before the raster is opened. On failure no
    /// file is created at `dst`.
    pub fn create_thumbnail<P, Q>(
        &self,
        src: P,
        dst: Q,
        bands: &[usize],
        target_size: u32,
        format: OutputFormat,
    ) -> Result<ThumbnailReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let selection = BandSelection::new(bands)?;
        self.stretch_to_file(src.as_ref(), dst.as_ref(), Some(selection), target_size, format)
    }

    /// Stretch path with bands 1-3 (or band 1 alone) and the format taken
    /// from the extension of `dst`
    pub fn raster_thumbnail<P, Q>(&self, src: P, dst: Q, target_size: u32) -> Result<ThumbnailReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let format = OutputFormat::from_path(dst.as_ref())?;
        self.stretch_to_file(src.as_ref(), dst.as_ref(), None, target_size, format)
    }

    /// Writes a PNG composite of 1 to 4 bands scaled to `percent` of the
    /// source size, without stretching
    pub fn truecolor_thumbnail<P, Q>(&self, src: P, dst: Q, bands: &[usize], percent: f64) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        if !percent.is_finite() || percent <= 0.0 {
            return Err(Error::InvalidTarget(format!("percentage {} must be positive", percent)));
        }
        if bands.is_empty() || bands.len() > truecolor::MAX_COMPOSITE_BANDS {
            return Err(Error::InvalidBandSelection(format!(
                "expected 1 to {} bands, got {}",
                truecolor::MAX_COMPOSITE_BANDS,
                bands.len()
            )));
        }

        let composite = {
            let mut raster = open_raster(src, &self.config)?;
            composite_thumbnail(&mut raster, bands, percent)?
        };

        let png = OutputFormat::Png.encode(&composite, self.config.jpeg_quality)?;
        fs::write(dst, png)?;

        log::info!(
            "Wrote {}x{} composite of {} to {}",
            composite.width(),
            composite.height(),
            src.display(),
            dst.display()
        );
        Ok(())
    }

    /// Runs the stats scan and the stretch pass over an open raster
    pub fn render<S>(&self, source: &mut S, selection: &BandSelection, target_size: u32) -> Result<RenderedThumbnail>
    where
        S: RasterSource + ?Sized,
    {
        self.render_traced(source, selection, target_size, &mut Vec::new())
    }

    /// Stretch path over an already open raster, which is dropped once the
    /// image is encoded
    ///
    /// `selection` defaults to bands 1-3 (or band 1 alone). For formats other
    /// than BMP the intermediate file is created before any row is read.
    pub fn thumbnail_from_source<S>(
        &self,
        mut source: S,
        dst: &Path,
        selection: Option<BandSelection>,
        target_size: u32,
        format: OutputFormat,
    ) -> Result<ThumbnailReport>
    where
        S: RasterSource,
    {
        if target_size == 0 {
            return Err(Error::InvalidTarget("target size must be positive".to_string()));
        }

        let mut stages = Vec::with_capacity(6);
        stages.push(Stage::Opened);

        let selection = selection.unwrap_or_else(|| BandSelection::automatic(source.band_count()));
        selection.validate_against(source.band_count())?;

        let intermediate = match format {
            OutputFormat::Bmp => None,
            _ => Some(self.create_intermediate()?),
        };

        let rendered = self.render_traced(&mut source, &selection, target_size, &mut stages)?;
        drop(source);

        let (bytes, nodata) = self.encode_output(&rendered.image, format, intermediate, &mut stages)?;
        fs::write(dst, bytes)?;
        stages.push(Stage::Closed);

        let image = &rendered.image;
        Ok(ThumbnailReport {
            format,
            width: image.width(),
            height: image.height(),
            bands: image.bands(),
            step: rendered.stride.step(),
            stats: rendered.stats,
            nodata,
            stages,
        })
    }

    fn render_traced<S>(
        &self,
        source: &mut S,
        selection: &BandSelection,
        target_size: u32,
        stages: &mut Vec<Stage>,
    ) -> Result<RenderedThumbnail>
    where
        S: RasterSource + ?Sized,
    {
        selection.validate_against(source.band_count())?;
        let stride = DecimationStride::for_target(source.dimensions(), target_size)?;

        let stats = scan_band_statistics(source, selection)?;
        stages.push(Stage::StatsComputed);

        let image = resample_and_stretch(source, selection, &stats, stride)?;
        stages.push(Stage::ResampledEncoded);

        Ok(RenderedThumbnail { image, stats, stride })
    }

    fn stretch_to_file(
        &self,
        src: &Path,
        dst: &Path,
        selection: Option<BandSelection>,
        target_size: u32,
        format: OutputFormat,
    ) -> Result<ThumbnailReport> {
        if target_size == 0 {
            return Err(Error::InvalidTarget("target size must be positive".to_string()));
        }

        let raster = open_raster(src, &self.config)?;
        log::debug!("Opened {} ({} bands)", src.display(), raster.band_count());

        let report = self.thumbnail_from_source(raster, dst, selection, target_size, format)?;
        log::info!(
            "Wrote {}x{} {} thumbnail of {} to {}",
            report.width,
            report.height,
            format,
            src.display(),
            dst.display()
        );
        Ok(report)
    }

    /// Encodes the 8-bit image into `format`, through `intermediate` unless
    /// the output is BMP
    fn encode_output(
        &self,
        encoded: &EncodedImage,
        format: OutputFormat,
        intermediate: Option<NamedTempFile>,
        stages: &mut Vec<Stage>,
    ) -> Result<(Vec<u8>, Option<u32>)> {
        let quality = self.config.jpeg_quality;
        let bitmap = OutputFormat::Bmp.encode(&encoded.to_dynamic_image()?, quality)?;
        let Some(mut intermediate) = intermediate else {
            return Ok((bitmap, None));
        };

        // Removed when it goes out of scope, on success or error
        intermediate.write_all(&bitmap)?;
        intermediate.flush()?;
        let mut decoded = image::open(intermediate.path())?;
        if encoded.bands() == 1 {
            decoded = DynamicImage::ImageLuma8(decoded.to_luma8());
        }
        stages.push(Stage::FormatConverted);
        log::debug!("Converting intermediate {} to {}", intermediate.path().display(), format);

        if !format.supports_transparency() {
            return Ok((format.encode(&decoded, quality)?, None));
        }

        let rgba = decoded.to_rgba8();
        let nodata = detect_border_nodata(&rgba);
        let masked = match nodata {
            Some(color) => mask_nodata(&rgba, color),
            None => rgba,
        };
        stages.push(Stage::TransparencyApplied);

        Ok((format.encode(&DynamicImage::ImageRgba8(masked), quality)?, nodata))
    }

    fn create_intermediate(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("thumbnail-").suffix(".bmp");

        let file = match &self.config.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }
}

/// Stretch-path thumbnail with the default configuration
///
/// Returns `false` and logs the cause on any failure.
pub fn create_thumbnail<P, Q>(src: P, dst: Q, bands: &[usize], target_size: u32, format: &str) -> bool
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let result = OutputFormat::from_token(format).and_then(|format| {
        ThumbnailPipeline::default().create_thumbnail(src.as_ref(), dst.as_ref(), bands, target_size, format)
    });

    match result {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Thumbnail of {} failed: {}", src.as_ref().display(), e);
            false
        }
    }
}

/// Percentage-path thumbnail with the default configuration; failures are
/// logged and otherwise ignored
pub fn truecolor_thumbnail<P, Q>(src: P, dst: Q, bands: &[usize], percent: f64)
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    if let Err(e) = ThumbnailPipeline::default().truecolor_thumbnail(src.as_ref(), dst.as_ref(), bands, percent) {
        log::warn!("Composite of {} failed: {}", src.as_ref().display(), e);
    }
}

/// Automatic-band thumbnail with the default configuration
pub fn raster_thumbnail<P, Q>(src: P, dst: Q, target_size: u32) -> bool
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    match ThumbnailPipeline::default().raster_thumbnail(src.as_ref(), dst.as_ref(), target_size) {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Thumbnail of {} failed: {}", src.as_ref().display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::counting::CountingRaster;
    use crate::raster::MemoryRaster;

    fn write_png(path: &Path, image: image::RgbImage) {
        image.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_render_gradient() {
        let mut raster = MemoryRaster::from_fn(100, 50, 1, |_, x, y| ((x + y * 100) % 1001) as f64);
        let pipeline = ThumbnailPipeline::default();

        let rendered = pipeline.render(&mut raster, &BandSelection::new(&[1]).unwrap(), 50).unwrap();
        assert_eq!(rendered.stride.step(), 2);
        assert_eq!((rendered.image.width(), rendered.image.height()), (50, 25));
        assert_eq!(rendered.stats[0], BandStats { min: 0.0, max: 1000.0 });
    }

    #[test]
    fn test_render_rejects_band_beyond_count() {
        let mut raster = MemoryRaster::filled(4, 4, 3, 1.0);
        let result = ThumbnailPipeline::default().render(&mut raster, &BandSelection::new(&[1, 2, 4]).unwrap(), 2);
        assert!(matches!(result, Err(Error::BandOutOfRange { band: 4, band_count: 3 })));
    }

    #[test]
    fn test_stats_stage_recorded_before_resample_failure() {
        let inner = MemoryRaster::from_fn(4, 4, 1, |_, x, _| x as f64);
        // The stats pass reads 4 rows; the first resample read fails
        let mut raster = CountingRaster::failing_after(inner, 4);
        let mut stages = Vec::new();

        let result = ThumbnailPipeline::default().render_traced(
            &mut raster,
            &BandSelection::new(&[1]).unwrap(),
            2,
            &mut stages,
        );
        assert!(result.is_err());
        assert_eq!(stages, vec![Stage::StatsComputed]);
    }

    #[test]
    fn test_unusable_temp_dir_fails_before_reading_rows() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out.png");
        let config = ThumbnailConfig {
            temp_dir: Some(dir.path().join("missing")),
            ..ThumbnailConfig::default()
        };
        let pipeline = ThumbnailPipeline::new(config);
        let mut raster = CountingRaster::new(MemoryRaster::filled(8, 8, 3, 1.0));

        let result = pipeline.thumbnail_from_source(&mut raster, &dst, None, 4, OutputFormat::Png);
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(raster.rows_read, 0);
        assert!(!dst.exists());

        // BMP output needs no intermediate
        let bmp = dir.path().join("out.bmp");
        let report = pipeline
            .thumbnail_from_source(&mut raster, &bmp, None, 4, OutputFormat::Bmp)
            .unwrap();
        assert_eq!(report.bands, 3);
        assert!(raster.rows_read > 0);
    }

    #[test]
    fn test_bmp_output_skips_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let (src, dst) = (dir.path().join("in.png"), dir.path().join("out.bmp"));
        write_png(&src, image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30])));

        let report = ThumbnailPipeline::default()
            .create_thumbnail(&src, &dst, &[1, 2, 3], 4, OutputFormat::Bmp)
            .unwrap();

        assert_eq!(
            report.stages,
            vec![Stage::Opened, Stage::StatsComputed, Stage::ResampledEncoded, Stage::Closed]
        );
        assert_eq!((report.width, report.height, report.bands), (4, 4, 3));
        assert_eq!(&fs::read(&dst).unwrap()[..2], b"BM");
    }

    #[test]
    fn test_png_output_masks_border() {
        let dir = tempfile::tempdir().unwrap();
        let (src, dst) = (dir.path().join("in.png"), dir.path().join("out.png"));
        write_png(
            &src,
            image::RgbImage::from_fn(6, 6, |x, y| {
                if x == 0 || y == 0 || x == 5 || y == 5 {
                    image::Rgb([0, 0, 0])
                } else {
                    image::Rgb([200, 100, 50])
                }
            }),
        );

        let config = ThumbnailConfig {
            temp_dir: Some(dir.path().to_path_buf()),
            ..ThumbnailConfig::default()
        };
        let report = ThumbnailPipeline::new(config)
            .create_thumbnail(&src, &dst, &[1, 2, 3], 6, OutputFormat::Png)
            .unwrap();

        assert_eq!(report.nodata, Some(0x000000));
        assert!(report.stages.contains(&Stage::TransparencyApplied));

        let output = image::open(&dst).unwrap().to_rgba8();
        assert_eq!(output.get_pixel(0, 0).0[3], 0);
        assert_eq!(output.get_pixel(2, 2).0[3], 255);

        // Intermediate file is gone
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("thumbnail-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_jpeg_output_has_no_transparency_stage() {
        let dir = tempfile::tempdir().unwrap();
        let (src, dst) = (dir.path().join("in.png"), dir.path().join("out.jpg"));
        write_png(&src, image::RgbImage::from_pixel(8, 8, image::Rgb([90, 90, 90])));

        let report = ThumbnailPipeline::default().raster_thumbnail(&src, &dst, 8).unwrap();

        assert_eq!(report.format, OutputFormat::Jpeg);
        assert!(report.stages.contains(&Stage::FormatConverted));
        assert!(!report.stages.contains(&Stage::TransparencyApplied));
        assert_eq!(&fs::read(&dst).unwrap()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_band_length_checked_before_open() {
        let result = ThumbnailPipeline::default().create_thumbnail(
            "does/not/exist.tif",
            "unused.bmp",
            &[1, 2],
            64,
            OutputFormat::Bmp,
        );
        assert!(matches!(result, Err(Error::InvalidBandSelection(_))));
    }

    #[test]
    fn test_facade_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out.png");

        assert!(!create_thumbnail(dir.path().join("missing.tif"), &dst, &[1], 64, "PNG"));
        assert!(!create_thumbnail(dir.path().join("missing.tif"), &dst, &[1], 64, "TIFF"));
        truecolor_thumbnail(dir.path().join("missing.tif"), &dst, &[1], 10.0);
        assert!(!dst.exists());
    }

    #[test]
    fn test_truecolor_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let (src, dst) = (dir.path().join("in.png"), dir.path().join("out.png"));
        write_png(&src, image::RgbImage::from_pixel(20, 10, image::Rgb([1, 2, 3])));

        ThumbnailPipeline::default()
            .truecolor_thumbnail(&src, &dst, &[3, 2, 1], 50.0)
            .unwrap();

        let output = image::open(&dst).unwrap();
        assert_eq!((output.width(), output.height()), (10, 5));
        assert_eq!(output.to_rgb8().get_pixel(0, 0).0, [3, 2, 1]);
    }
}
