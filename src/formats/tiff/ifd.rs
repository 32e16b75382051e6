//! Image File Directory (IFD) structures

use std::collections::HashMap;
use super::tags;

/// One IFD entry with its integer values already resolved
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Values of integer-typed fields, widened to u64; empty for other types
    pub values: Vec<u64>,
}

impl IFDEntry {
    pub fn new(tag: u16, field_type: u16, count: u64, values: Vec<u64>) -> Self {
        Self {
            tag,
            field_type,
            count,
            values,
        }
    }

    /// Total byte size of the entry's payload; `None` when the count overflows
    pub fn payload_size(&self) -> Option<u64> {
        (tags::field_type_size(self.field_type) as u64).checked_mul(self.count)
    }

    /// Whether the payload fits in the entry's value field
    pub fn is_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.payload_size().is_some_and(|size| size <= inline_size)
    }

    /// Whether the field type carries unsigned integers
    pub fn is_integer(&self) -> bool {
        use super::tags::field_types::*;
        matches!(self.field_type, BYTE | SHORT | LONG | LONG8 | IFD8)
    }
}

/// An Image File Directory
#[derive(Debug, Clone, Default)]
pub struct IFD {
    /// Offset of this IFD in the file
    pub offset: u64,
    /// Entries in file order
    pub entries: Vec<IFDEntry>,
    tag_map: HashMap<u16, usize>,
}

impl IFD {
    pub fn new(offset: u64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Adds an entry; a repeated tag replaces the earlier lookup
    pub fn add_entry(&mut self, entry: IFDEntry) {
        self.tag_map.insert(entry.tag, self.entries.len());
        self.entries.push(entry);
    }

    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag).and_then(|&idx| self.entries.get(idx))
    }

    /// First integer value of a tag
    pub fn get_u64(&self, tag: u16) -> Option<u64> {
        self.get_entry(tag).and_then(|e| e.values.first().copied())
    }

    /// All integer values of a tag
    pub fn get_values(&self, tag: u16) -> Option<&[u64]> {
        self.get_entry(tag).map(|e| e.values.as_slice())
    }

    pub fn is_tiled(&self) -> bool {
        self.get_entry(tags::TILE_WIDTH).is_some() && self.get_entry(tags::TILE_LENGTH).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::tags::field_types;

    #[test]
    fn test_entry_inline_size() {
        let short = IFDEntry::new(tags::IMAGE_WIDTH, field_types::SHORT, 2, vec![1, 2]);
        assert!(short.is_inline(false));

        let longs = IFDEntry::new(tags::STRIP_OFFSETS, field_types::LONG, 2, vec![8, 16]);
        assert!(!longs.is_inline(false));
        assert!(longs.is_inline(true));
    }

    #[test]
    fn test_payload_size_overflow() {
        let huge = IFDEntry::new(tags::STRIP_OFFSETS, field_types::LONG8, 1 << 62, Vec::new());
        assert_eq!(huge.payload_size(), None);
        assert!(!huge.is_inline(true));

        let longs = IFDEntry::new(tags::STRIP_OFFSETS, field_types::LONG, 3, Vec::new());
        assert_eq!(longs.payload_size(), Some(12));
    }

    #[test]
    fn test_lookup() {
        let mut ifd = IFD::new(8);
        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, vec![640]));
        ifd.add_entry(IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 3, vec![8, 8, 8]));

        assert_eq!(ifd.get_u64(tags::IMAGE_WIDTH), Some(640));
        assert_eq!(ifd.get_values(tags::BITS_PER_SAMPLE), Some(&[8u64, 8, 8][..]));
        assert_eq!(ifd.get_u64(tags::IMAGE_LENGTH), None);
        assert!(!ifd.is_tiled());
    }
}
