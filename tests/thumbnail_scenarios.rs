use std::fs;
use std::path::Path;
use skyforest_thumbnailer::{
    create_thumbnail, open_raster, Error, OutputFormat, RasterSource, Stage, ThumbnailConfig,
    ThumbnailPipeline,
};

/// Writes a single-strip, chunky, uncompressed little-endian TIFF of u16 samples
fn write_tiff_u16<F>(path: &Path, width: usize, height: usize, bands: usize, value: F)
where
    F: Fn(usize, usize, usize) -> u16,
{
    let mut data = Vec::with_capacity(width * height * bands * 2);
    for y in 0..height {
        for x in 0..width {
            for b in 0..bands {
                data.extend_from_slice(&value(b, x, y).to_le_bytes());
            }
        }
    }

    let photometric = if bands >= 3 { 2 } else { 1 };
    let mut entries: Vec<(u16, u32)> = vec![
        (256, width as u32),
        (257, height as u32),
        (258, 16),
        (259, 1),
        (262, photometric),
        (273, 0),
        (277, bands as u32),
        (278, height as u32),
        (279, data.len() as u32),
        (284, 1),
        (339, 1),
    ];
    let data_offset = (8 + 2 + entries.len() * 12 + 4) as u32;
    if let Some(entry) = entries.iter_mut().find(|(tag, _)| *tag == 273) {
        entry.1 = data_offset;
    }

    let mut file = b"II".to_vec();
    file.extend_from_slice(&42u16.to_le_bytes());
    file.extend_from_slice(&8u32.to_le_bytes());
    file.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, value) in &entries {
        file.extend_from_slice(&tag.to_le_bytes());
        file.extend_from_slice(&4u16.to_le_bytes());
        file.extend_from_slice(&1u32.to_le_bytes());
        file.extend_from_slice(&value.to_le_bytes());
    }
    file.extend_from_slice(&0u32.to_le_bytes());
    file.extend_from_slice(&data);

    fs::write(path, file).unwrap();
}

fn scratch_config(dir: &Path) -> ThumbnailConfig {
    ThumbnailConfig {
        temp_dir: Some(dir.to_path_buf()),
        ..ThumbnailConfig::default()
    }
}

#[test]
fn test_tiff_opens_natively() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("bands.tif");
    write_tiff_u16(&src, 7, 3, 2, |b, x, y| (b * 1000 + y * 7 + x) as u16);

    let mut raster = open_raster(&src, &ThumbnailConfig::default()).unwrap();
    assert_eq!(raster.band_count(), 2);

    let mut row = vec![0.0; 7];
    raster.read_row(1, 2, &mut row).unwrap();
    assert_eq!(row[0], 1014.0);
    assert_eq!(row[6], 1020.0);
}

#[test]
fn test_gradient_to_bmp() {
    let dir = tempfile::tempdir().unwrap();
    let (src, dst) = (dir.path().join("gradient.tif"), dir.path().join("gradient.bmp"));
    write_tiff_u16(&src, 100, 50, 1, |_, x, y| ((x + y * 100) % 1001) as u16);

    let report = ThumbnailPipeline::new(scratch_config(dir.path()))
        .create_thumbnail(&src, &dst, &[1], 50, OutputFormat::Bmp)
        .unwrap();

    assert_eq!(report.step, 2);
    assert_eq!((report.width, report.height, report.bands), (50, 25, 1));
    assert_eq!(report.stats[0].min, 0.0);
    assert_eq!(report.stats[0].max, 1000.0);

    let bytes = fs::read(&dst).unwrap();
    assert_eq!(&bytes[..2], b"BM");
    // Bits per pixel in the info header
    assert_eq!(u16::from_le_bytes([bytes[28], bytes[29]]), 8);

    let image = image::load_from_memory(&bytes).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (50, 25));
    assert_eq!(image.get_pixel(0, 0).0[0], 0);
    // Source pixel (0, 10) holds the maximum, which clamps to 255
    assert_eq!(image.get_pixel(0, 5).0[0], 255);
}

#[test]
fn test_constant_band_encodes_to_zero() {
    let dir = tempfile::tempdir().unwrap();
    let (src, dst) = (dir.path().join("flat.tif"), dir.path().join("flat.bmp"));
    write_tiff_u16(&src, 10, 10, 1, |_, _, _| 42);

    let report = ThumbnailPipeline::new(scratch_config(dir.path()))
        .create_thumbnail(&src, &dst, &[1], 256, OutputFormat::Bmp)
        .unwrap();
    assert_eq!(report.step, 1);

    let image = image::open(&dst).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (10, 10));
    assert!(image.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn test_band_beyond_count_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let (src, dst) = (dir.path().join("rgb.tif"), dir.path().join("rgb.png"));
    write_tiff_u16(&src, 8, 8, 3, |b, x, _| (b + x) as u16);

    let result = ThumbnailPipeline::new(scratch_config(dir.path()))
        .create_thumbnail(&src, &dst, &[1, 2, 4], 4, OutputFormat::Png);
    assert!(matches!(result, Err(Error::BandOutOfRange { band: 4, band_count: 3 })));
    assert!(!dst.exists());

    assert!(!create_thumbnail(&src, &dst, &[1, 2, 4], 4, "PNG"));
    assert!(!dst.exists());
}

#[test]
fn test_band_list_lengths() {
    let dir = tempfile::tempdir().unwrap();
    let (src, dst) = (dir.path().join("rgb.tif"), dir.path().join("out.bmp"));
    write_tiff_u16(&src, 4, 4, 4, |b, _, _| b as u16);
    let pipeline = ThumbnailPipeline::new(scratch_config(dir.path()));

    for bands in [&[][..], &[1, 2], &[1, 2, 3, 4]] {
        let result = pipeline.create_thumbnail(&src, &dst, bands, 4, OutputFormat::Bmp);
        assert!(matches!(result, Err(Error::InvalidBandSelection(_))));
    }
    assert!(!dst.exists());

    assert!(pipeline.create_thumbnail(&src, &dst, &[4, 3, 2], 4, OutputFormat::Bmp).is_ok());
}

#[test]
fn test_png_border_becomes_transparent() {
    let dir = tempfile::tempdir().unwrap();
    let (src, dst) = (dir.path().join("framed.tif"), dir.path().join("framed.png"));
    write_tiff_u16(&src, 12, 12, 3, |b, x, y| {
        if x == 0 || y == 0 || x == 11 || y == 11 {
            0
        } else {
            (500 + b * 100 + x) as u16
        }
    });

    let report = ThumbnailPipeline::new(scratch_config(dir.path()))
        .create_thumbnail(&src, &dst, &[1, 2, 3], 12, OutputFormat::Png)
        .unwrap();

    assert_eq!(report.nodata, Some(0x000000));
    assert_eq!(
        report.stages,
        vec![
            Stage::Opened,
            Stage::StatsComputed,
            Stage::ResampledEncoded,
            Stage::FormatConverted,
            Stage::TransparencyApplied,
            Stage::Closed,
        ]
    );

    let image = image::open(&dst).unwrap().to_rgba8();
    assert_eq!(image.get_pixel(0, 0).0[3], 0);
    assert_eq!(image.get_pixel(11, 6).0[3], 0);
    assert_eq!(image.get_pixel(6, 6).0[3], 255);
}

#[test]
fn test_gif_and_jpeg_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("scene.tif");
    write_tiff_u16(&src, 40, 20, 3, |b, x, y| (b * 10 + x + y) as u16);
    let pipeline = ThumbnailPipeline::new(scratch_config(dir.path()));

    let gif = dir.path().join("scene.gif");
    pipeline.create_thumbnail(&src, &gif, &[1, 2, 3], 20, OutputFormat::Gif).unwrap();
    assert_eq!(&fs::read(&gif).unwrap()[..3], b"GIF");

    let jpeg = dir.path().join("scene.jpg");
    let report = pipeline.raster_thumbnail(&src, &jpeg, 20).unwrap();
    assert_eq!((report.width, report.height), (20, 10));
    let decoded = image::open(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 10));
}

#[test]
fn test_truecolor_from_tiff() {
    let dir = tempfile::tempdir().unwrap();
    let (src, dst) = (dir.path().join("rgb.tif"), dir.path().join("rgb.png"));
    write_tiff_u16(&src, 30, 10, 3, |b, _, _| [12, 400, 77][b]);

    ThumbnailPipeline::default()
        .truecolor_thumbnail(&src, &dst, &[1, 2, 3], 10.0)
        .unwrap();

    let image = image::open(&dst).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (3, 1));
    // 400 saturates at 255
    assert_eq!(image.get_pixel(1, 0).0, [12, 255, 77]);

    let missing = dir.path().join("never.png");
    let result = ThumbnailPipeline::default().truecolor_thumbnail(&src, &missing, &[1, 5], 10.0);
    assert!(matches!(result, Err(Error::BandOutOfRange { band: 5, .. })));
    assert!(!missing.exists());
}
