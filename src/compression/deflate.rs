//! Deflate/ZIP block decoding

use crate::error::Result;
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Inflates a zlib-wrapped block
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut inflated = Vec::with_capacity(expected_len);
    ZlibDecoder::new(data).read_to_end(&mut inflated)?;
    Ok(inflated)
}
