//! Window header.
//!
//! Every window starts with a [`WindowHeader`] holding the allocation
//! cursor and the table shape.

use crate::common::config::HEADER_SIZE;

use super::cell::{read_u32, write_u32};

/// Metadata stored at the beginning of every window.
///
/// # Layout (16 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     free_offset (lowest unused byte, little-endian)
/// 4       4     first_chunk_offset (first row slot chunk)
/// 8       4     num_rows
/// 12      4     num_columns
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowHeader {
    /// Offset of the lowest unused byte in the window.
    pub free_offset: u32,
    /// Offset of the first row slot chunk.
    pub first_chunk_offset: u32,
    pub num_rows: u32,
    pub num_columns: u32,
}

impl WindowHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = HEADER_SIZE;

    /// Offset of each field within the header.
    pub const OFFSET_FREE_OFFSET: usize = 0;
    pub const OFFSET_FIRST_CHUNK: usize = 4;
    pub const OFFSET_NUM_ROWS: usize = 8;
    pub const OFFSET_NUM_COLUMNS: usize = 12;

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < WindowHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for WindowHeader");

        Self {
            free_offset: read_u32(data, Self::OFFSET_FREE_OFFSET),
            first_chunk_offset: read_u32(data, Self::OFFSET_FIRST_CHUNK),
            num_rows: read_u32(data, Self::OFFSET_NUM_ROWS),
            num_columns: read_u32(data, Self::OFFSET_NUM_COLUMNS),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < WindowHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for WindowHeader");

        write_u32(data, Self::OFFSET_FREE_OFFSET, self.free_offset);
        write_u32(data, Self::OFFSET_FIRST_CHUNK, self.first_chunk_offset);
        write_u32(data, Self::OFFSET_NUM_ROWS, self.num_rows);
        write_u32(data, Self::OFFSET_NUM_COLUMNS, self.num_columns);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_default() {
        let header = WindowHeader::default();
        assert_eq!(header.free_offset, 0);
        assert_eq!(header.num_rows, 0);
        assert_eq!(header.num_columns, 0);
    }

    #[test]
    fn test_header_byte_layout() {
        let header = WindowHeader {
            free_offset: 0x04030201, // Little-endian: 01 02 03 04
            first_chunk_offset: 16,
            num_rows: 7,
            num_columns: 0x0D0C0B0A,
        };

        let mut buffer = [0u8; WindowHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(buffer[0], 0x01); // free_offset byte 0 (LSB)
        assert_eq!(buffer[3], 0x04); // free_offset byte 3 (MSB)
        assert_eq!(buffer[4], 16);
        assert_eq!(buffer[8], 7);
        assert_eq!(buffer[12], 0x0A);
        assert_eq!(buffer[15], 0x0D);

        assert_eq!(WindowHeader::from_bytes(&buffer), header);
    }

    #[test]
    #[should_panic(expected = "buffer too small for WindowHeader")]
    fn test_header_short_buffer() {
        WindowHeader::from_bytes(&[0u8; 4]);
    }
}
