//! skyforest-thumbnailer - Preview images from multi-band rasters
//!
//! Reads TIFF/BigTIFF rasters natively (strips or tiles, common
//! compressions) and decodes PNG/JPEG/BMP/GIF through the `image` crate,
//! then produces small 8-bit previews:
//!
//! - a linear min/max stretch of one or three bands, decimated to fit a
//!   target size and written as BMP, JPEG, PNG or GIF (PNG gets the
//!   dominant border color keyed out as transparent);
//! - a percentage-scaled composite of up to four bands written as PNG.
//!
//! # Examples
//!
//! ## Stretched thumbnail
//!
//! ```no_run
//! use skyforest_thumbnailer::{OutputFormat, ThumbnailConfig, ThumbnailPipeline};
//!
//! let pipeline = ThumbnailPipeline::new(ThumbnailConfig::default());
//! let report = pipeline.create_thumbnail("scene.tif", "scene.png", &[4, 3, 2], 256, OutputFormat::Png)?;
//!
//! println!("{}x{} (step {})", report.width, report.height, report.step);
//! # Ok::<(), skyforest_thumbnailer::Error>(())
//! ```
//!
//! ## Reading rows directly
//!
//! ```no_run
//! use skyforest_thumbnailer::{open_raster, RasterSource, ThumbnailConfig};
//!
//! let mut raster = open_raster("dem.tif", &ThumbnailConfig::default())?;
//! let dims = raster.dimensions();
//! let mut row = vec![0.0; dims.width];
//! raster.read_row(0, dims.height / 2, &mut row)?;
//! # Ok::<(), skyforest_thumbnailer::Error>(())
//! ```

pub mod io;
pub mod error;
pub mod types;
pub mod formats;
pub mod compression;
pub mod cache;
pub mod config;
pub mod raster;
pub mod thumbnail;

pub use error::{Error, Result};
pub use types::{DataType, Dimensions};
pub use io::ByteOrder;
pub use config::ThumbnailConfig;
pub use formats::tiff::{BlockLayout, TiffRaster, TiffReader, BIGTIFF_MAGIC, TIFF_MAGIC};
pub use raster::{open_raster, MemoryRaster, RasterSource};
pub use thumbnail::{
    create_thumbnail, raster_thumbnail, truecolor_thumbnail, BandSelection, BandStats,
    OutputFormat, Stage, ThumbnailPipeline, ThumbnailReport,
};
