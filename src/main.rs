use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use log::{debug, info};
use skyforest_thumbnailer::{
    open_raster, OutputFormat, RasterSource, Result, ThumbnailConfig, ThumbnailPipeline, TiffRaster,
    TiffReader,
};

/// Thumbnail generator for multi-band rasters
#[derive(Parser, Debug)]
#[command(name = "skyforest-thumbnailer", version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Min/max stretch of one or three bands
    Stretch {
        input: PathBuf,
        output: PathBuf,

        /// One-based band indices, e.g. "3,2,1"
        #[arg(long, value_delimiter = ',', default_value = "1")]
        bands: Vec<usize>,

        /// Longest output side; the config value when omitted
        #[arg(long)]
        size: Option<u32>,

        /// BMP, JPEG, PNG or GIF; taken from the output extension when omitted
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Percentage-scaled PNG composite without stretching
    Truecolor {
        input: PathBuf,
        output: PathBuf,

        #[arg(long, value_delimiter = ',', default_value = "1,2,3")]
        bands: Vec<usize>,

        #[arg(long, default_value_t = 10.0)]
        percent: f64,
    },

    /// Stretch with automatic band choice and format from the output extension
    Auto {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        size: Option<u32>,
    },

    /// Print raster dimensions, bands and TIFF layout
    Info { input: PathBuf },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    debug!("Parsed CLI args: {:?}", cli);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ThumbnailConfig::from_file(path)?,
        None => ThumbnailConfig::default(),
    };
    let default_size = config.target_size;
    let pipeline = ThumbnailPipeline::new(config);

    match cli.command {
        Command::Stretch { input, output, bands, size, format } => {
            let format = match format {
                Some(format) => format,
                None => OutputFormat::from_path(&output)?,
            };
            let report = pipeline.create_thumbnail(&input, &output, &bands, size.unwrap_or(default_size), format)?;
            for (band, stats) in bands.iter().zip(&report.stats) {
                info!("Band {}: min {} max {}", band, stats.min, stats.max);
            }
            if let Some(color) = report.nodata {
                info!("Transparent border color: #{:06X}", color);
            }
        }
        Command::Truecolor { input, output, bands, percent } => {
            pipeline.truecolor_thumbnail(&input, &output, &bands, percent)?;
        }
        Command::Auto { input, output, size } => {
            let report = pipeline.raster_thumbnail(&input, &output, size.unwrap_or(default_size))?;
            debug!("Stages: {:?}", report.stages);
        }
        Command::Info { input } => print_info(&input, pipeline.config())?,
    }

    Ok(())
}

fn print_info(input: &Path, config: &ThumbnailConfig) -> Result<()> {
    println!("{}", input.display());

    if let Ok(reader) = TiffReader::open_with_options(input, config.use_mmap) {
        println!("  Byte order: {:?}", reader.byte_order());
        println!("  BigTIFF: {}", reader.is_big_tiff());
        let raster = TiffRaster::from_reader(reader, 1)?;
        println!("{}", raster.layout());
        return Ok(());
    }

    let raster = open_raster(input, config)?;
    let dims = raster.dimensions();
    println!("  Dimensions: {} x {}", dims.width, dims.height);
    println!("  Bands: {}", raster.band_count());
    Ok(())
}
