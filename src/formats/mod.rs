//! Raster container formats read natively

pub mod tiff;
