//! PackBits decoding
//!
//! Header byte `n` as i8: `0..=127` copies `n + 1` literal bytes,
//! `-127..=-1` repeats the next byte `1 - n` times, `-128` is a no-op.

use crate::error::{Error, Result};

/// Expands a PackBits run-length stream
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_len);
    let mut bytes = data.iter().copied();

    while let Some(header) = bytes.next() {
        match header as i8 {
            -128 => {}
            n @ 0..=127 => {
                let count = n as usize + 1;
                let before = output.len();
                output.extend(bytes.by_ref().take(count));
                if output.len() - before != count {
                    return Err(Error::InvalidFormat(
                        "PackBits literal run truncated".to_string(),
                    ));
                }
            }
            n => {
                let value = bytes.next().ok_or_else(|| {
                    Error::InvalidFormat("PackBits repeat run missing its byte".to_string())
                })?;
                let count = (1 - n as isize) as usize;
                output.resize(output.len() + count, value);
            }
        }

        if expected_len > 0 && output.len() >= expected_len {
            break;
        }
    }

    Ok(output)
}
