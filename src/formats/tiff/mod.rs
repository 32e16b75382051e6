//! Native TIFF and BigTIFF raster reading

pub mod tags;
pub mod ifd;
pub mod reader;
pub mod layout;
pub mod raster;

pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use layout::BlockLayout;
pub use raster::TiffRaster;

/// TIFF magic number (42)
pub const TIFF_MAGIC: u16 = 42;

/// BigTIFF magic number (43)
pub const BIGTIFF_MAGIC: u16 = 43;

/// Whether the leading bytes of a file announce a TIFF or BigTIFF
pub fn is_tiff_header(bytes: &[u8]) -> bool {
    matches!(
        bytes,
        [b'I', b'I', 42 | 43, 0, ..] | [b'M', b'M', 0, 42 | 43, ..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_tiff_header() {
        assert!(is_tiff_header(b"II*\0rest"));
        assert!(is_tiff_header(b"MM\0+"));
        assert!(!is_tiff_header(b"\x89PNG"));
        assert!(!is_tiff_header(b"II"));
    }
}
