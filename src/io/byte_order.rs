//! Byte order (endianness) handling
//!
//! Decodes multi-byte values from byte slices in the order declared by a
//! raster file header. TIFF files declare it with "II" or "MM".

use crate::error::{Error, Result};

/// Represents the byte order (endianness) of binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (least significant byte first)
    LittleEndian,
    /// Big-endian byte order (most significant byte first)
    BigEndian,
}

/// Copies the first `N` bytes of `bytes` into an array
fn take<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    if bytes.len() < N {
        return Err(Error::OutOfBounds(format!(
            "Need {} bytes, only {} available",
            N,
            bytes.len()
        )));
    }

    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    Ok(out)
}

impl ByteOrder {
    /// Detects byte order from TIFF magic bytes
    pub fn from_tiff_magic(magic: [u8; 2]) -> Result<Self> {
        match &magic {
            b"II" => Ok(ByteOrder::LittleEndian),
            b"MM" => Ok(ByteOrder::BigEndian),
            _ => Err(Error::InvalidByteOrder(u16::from_be_bytes(magic))),
        }
    }

    pub fn u16(&self, bytes: &[u8]) -> Result<u16> {
        let raw = take::<2>(bytes)?;
        Ok(match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        })
    }

    pub fn u32(&self, bytes: &[u8]) -> Result<u32> {
        let raw = take::<4>(bytes)?;
        Ok(match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
        })
    }

    pub fn u64(&self, bytes: &[u8]) -> Result<u64> {
        let raw = take::<8>(bytes)?;
        Ok(match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(raw),
            ByteOrder::BigEndian => u64::from_be_bytes(raw),
        })
    }

    /// Reads an unsigned integer of `width` bytes (1, 2, 4 or 8)
    pub fn uint(&self, bytes: &[u8], width: usize) -> Result<u64> {
        match width {
            1 => bytes
                .first()
                .map(|&b| b as u64)
                .ok_or_else(|| Error::OutOfBounds("Empty value".to_string())),
            2 => Ok(self.u16(bytes)? as u64),
            4 => Ok(self.u32(bytes)? as u64),
            8 => self.u64(bytes),
            _ => Err(Error::Unsupported(format!("{}-byte integer", width))),
        }
    }

    /// Writes the low `width` bytes of `value` into `out` in this byte order
    pub fn put_uint(&self, out: &mut [u8], value: u64, width: usize) {
        match (self, width) {
            (_, 1) => out[0] = value as u8,
            (ByteOrder::LittleEndian, 2) => out[..2].copy_from_slice(&(value as u16).to_le_bytes()),
            (ByteOrder::BigEndian, 2) => out[..2].copy_from_slice(&(value as u16).to_be_bytes()),
            (ByteOrder::LittleEndian, 4) => out[..4].copy_from_slice(&(value as u32).to_le_bytes()),
            (ByteOrder::BigEndian, 4) => out[..4].copy_from_slice(&(value as u32).to_be_bytes()),
            (ByteOrder::LittleEndian, _) => out[..8].copy_from_slice(&value.to_le_bytes()),
            (ByteOrder::BigEndian, _) => out[..8].copy_from_slice(&value.to_be_bytes()),
        }
    }
}
