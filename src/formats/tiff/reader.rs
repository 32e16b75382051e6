//! TIFF/BigTIFF header and directory parsing

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use memmap2::Mmap;
use crate::error::{Error, Result};
use crate::io::ByteOrder;
use super::{tags, IFD, IFDEntry, TIFF_MAGIC, BIGTIFF_MAGIC};

/// Upper bound on entries in one directory; real files stay far below it
const MAX_IFD_ENTRIES: u64 = 4096;

/// Where the file bytes come from
enum Backing {
    Mapped(Mmap),
    Stream { reader: BufReader<File>, len: u64 },
    Memory(Vec<u8>),
}

impl Backing {
    fn slice(bytes: &[u8], offset: u64, len: usize) -> Result<Vec<u8>> {
        let start = usize::try_from(offset)
            .map_err(|_| Error::OutOfBounds(format!("Offset {} exceeds address space", offset)))?;
        start
            .checked_add(len)
            .and_then(|end| bytes.get(start..end))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                Error::OutOfBounds(format!(
                    "Range {}+{} outside file of {} bytes",
                    offset,
                    len,
                    bytes.len()
                ))
            })
    }

    fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        match self {
            Backing::Mapped(mmap) => Self::slice(mmap, offset, len),
            Backing::Memory(bytes) => Self::slice(bytes, offset, len),
            Backing::Stream { reader, len: file_len } => {
                // Bounded before allocating; lengths come from the file
                let in_bounds = offset
                    .checked_add(len as u64)
                    .is_some_and(|end| end <= *file_len);
                if !in_bounds {
                    return Err(Error::OutOfBounds(format!(
                        "Range {}+{} outside file of {} bytes",
                        offset, len, file_len
                    )));
                }
                reader.seek(SeekFrom::Start(offset))?;
                let mut buffer = vec![0u8; len];
                reader.read_exact(&mut buffer)?;
                Ok(buffer)
            }
        }
    }
}

/// Low-level TIFF reader: header, main directory and raw byte ranges
pub struct TiffReader {
    backing: Backing,
    byte_order: ByteOrder,
    is_big_tiff: bool,
    first_ifd_offset: u64,
}

impl TiffReader {
    /// Opens a TIFF file, memory mapping it
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, true)
    }

    /// Opens a TIFF file
    ///
    /// # Arguments
    /// * `path` - Path to the TIFF file
    /// * `use_mmap` - Map the file instead of reading through a buffered stream
    pub fn open_with_options<P: AsRef<Path>>(path: P, use_mmap: bool) -> Result<Self> {
        let file = File::open(&path)?;

        let backing = if use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };

            #[cfg(unix)]
            unsafe {
                libc::madvise(
                    mmap.as_ptr() as *mut libc::c_void,
                    mmap.len(),
                    libc::MADV_SEQUENTIAL | libc::MADV_WILLNEED,
                );
            }

            Backing::Mapped(mmap)
        } else {
            let len = file.metadata()?.len();
            Backing::Stream {
                reader: BufReader::new(file),
                len,
            }
        };

        Self::from_backing(backing)
    }

    /// Reads a TIFF held entirely in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_backing(Backing::Memory(bytes))
    }

    fn from_backing(mut backing: Backing) -> Result<Self> {
        let header = backing.read_at(0, 8)?;
        let byte_order = ByteOrder::from_tiff_magic([header[0], header[1]])?;
        let magic = byte_order.u16(&header[2..])?;

        let (is_big_tiff, first_ifd_offset) = match magic {
            TIFF_MAGIC => (false, byte_order.u32(&header[4..])? as u64),
            BIGTIFF_MAGIC => {
                let offset_size = byte_order.u16(&header[4..])?;
                if offset_size != 8 {
                    return Err(Error::InvalidFormat(format!(
                        "Invalid BigTIFF offset size: {}",
                        offset_size
                    )));
                }
                let offset = backing.read_at(8, 8)?;
                (true, byte_order.u64(&offset)?)
            }
            _ => return Err(Error::InvalidMagic(magic)),
        };

        Ok(Self {
            backing,
            byte_order,
            is_big_tiff,
            first_ifd_offset,
        })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Reads `len` bytes starting at `offset`
    pub fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.backing.read_at(offset, len)
    }

    /// Reads the first image directory, resolving integer tag values
    pub fn read_main_ifd(&mut self) -> Result<IFD> {
        let offset = self.first_ifd_offset;
        if offset == 0 {
            return Err(Error::InvalidFormat("File contains no image directory".to_string()));
        }

        let order = self.byte_order;
        let (count_size, entry_size, field_size) = if self.is_big_tiff {
            (8, 20, 8)
        } else {
            (2, 12, 4)
        };

        let count_bytes = self.read_at(offset, count_size)?;
        let entry_count = order.uint(&count_bytes, count_size)?;
        if entry_count > MAX_IFD_ENTRIES {
            return Err(Error::InvalidFormat(format!(
                "Directory claims {} entries",
                entry_count
            )));
        }

        let table = self.read_at(offset + count_size as u64, entry_count as usize * entry_size)?;
        let mut ifd = IFD::new(offset);

        for raw in table.chunks_exact(entry_size) {
            let tag = order.u16(raw)?;
            let field_type = order.u16(&raw[2..])?;
            let count = order.uint(&raw[4..], field_size)?;
            let value_field = &raw[4 + field_size..];

            let mut entry = IFDEntry::new(tag, field_type, count, Vec::new());
            if entry.is_integer() {
                let payload_size = entry
                    .payload_size()
                    .and_then(|size| usize::try_from(size).ok())
                    .ok_or_else(|| {
                        Error::InvalidFormat(format!(
                            "{} claims {} values",
                            tags::tag_name(tag),
                            count
                        ))
                    })?;

                let payload = if entry.is_inline(self.is_big_tiff) {
                    value_field[..payload_size].to_vec()
                } else {
                    let value_offset = order.uint(value_field, field_size)?;
                    self.read_at(value_offset, payload_size)?
                };

                let width = tags::field_type_size(field_type);
                entry.values = payload
                    .chunks_exact(width)
                    .map(|chunk| order.uint(chunk, width))
                    .collect::<Result<_>>()?;
            }

            ifd.add_entry(entry);
        }

        Ok(ifd)
    }
}
