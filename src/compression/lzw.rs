//! TIFF LZW decoding
//!
//! Codes are packed most-significant-bit first, start at 9 bits and widen
//! one code early (at 511, 1023 and 2047), as TIFF writers emit them.

use crate::error::{Error, Result};

const CLEAR_CODE: usize = 256;
const END_OF_INFORMATION: usize = 257;
const FIRST_FREE_CODE: usize = 258;
const MAX_CODE_WIDTH: u8 = 12;
const TABLE_LIMIT: usize = 1 << MAX_CODE_WIDTH;

/// Decodes an LZW compressed block
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_len);
    let mut table = StringTable::new();
    let mut codes = MsbBitReader::new(data);
    let mut width = 9u8;
    let mut previous: Option<usize> = None;

    while let Some(code) = codes.read(width) {
        let code = code as usize;

        if code == END_OF_INFORMATION {
            break;
        }

        if code == CLEAR_CODE {
            table.reset();
            width = 9;
            previous = None;
            continue;
        }

        let start = output.len();
        match previous {
            None => table.emit(code, &mut output)?,
            Some(prev) if code < table.len() => {
                table.emit(code, &mut output)?;
                table.push(prev, output[start]);
            }
            Some(prev) if code == table.len() => {
                table.emit(prev, &mut output)?;
                let first = output[start];
                output.push(first);
                table.push(prev, first);
            }
            Some(_) => {
                return Err(Error::InvalidFormat(format!("Invalid LZW code: {}", code)));
            }
        }
        previous = Some(code);

        if table.len() + 1 >= (1 << width) && width < MAX_CODE_WIDTH {
            width += 1;
        }

        if expected_len > 0 && output.len() >= expected_len {
            break;
        }
    }

    Ok(output)
}

/// Code table; the two control codes occupy empty slots
struct StringTable {
    entries: Vec<Vec<u8>>,
}

impl StringTable {
    fn new() -> Self {
        let mut entries = Vec::with_capacity(TABLE_LIMIT);
        entries.extend((0..=255u8).map(|b| vec![b]));
        entries.push(Vec::new());
        entries.push(Vec::new());
        Self { entries }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn reset(&mut self) {
        self.entries.truncate(FIRST_FREE_CODE);
    }

    fn emit(&self, code: usize, output: &mut Vec<u8>) -> Result<()> {
        match self.entries.get(code) {
            Some(entry) if !entry.is_empty() => {
                output.extend_from_slice(entry);
                Ok(())
            }
            _ => Err(Error::InvalidFormat(format!("Invalid LZW code: {}", code))),
        }
    }

    fn push(&mut self, prefix: usize, suffix: u8) {
        if self.entries.len() < TABLE_LIMIT {
            let mut entry = self.entries[prefix].clone();
            entry.push(suffix);
            self.entries.push(entry);
        }
    }
}

/// Reads variable-width codes, most significant bit first
struct MsbBitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> MsbBitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    fn read(&mut self, width: u8) -> Option<u16> {
        let width = width as usize;
        if self.bit_pos + width > self.data.len() * 8 {
            return None;
        }

        let mut code = 0u16;
        for _ in 0..width {
            let byte = self.data[self.bit_pos / 8];
            let bit = (byte >> (7 - (self.bit_pos % 8))) & 1;
            code = (code << 1) | bit as u16;
            self.bit_pos += 1;
        }
        Some(code)
    }
}
