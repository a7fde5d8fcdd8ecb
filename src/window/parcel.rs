//! Parcel encoding - a checksummed snapshot of a window's used bytes.
//!
//! # Layout
//! ```text
//! Offset     Size      Field
//! ------     ----      -----
//! 0          4         magic "CWIN"
//! 4          4         used_len (little-endian)
//! 8          4         start_position
//! 12         used_len  window bytes [0, free_offset)
//! 12+len     4         CRC32 of everything before it
//! ```
//!
//! A window rebuilt from a parcel is read-only and exactly as large as
//! the bytes it carries.

use tracing::{debug, warn};

use crate::common::config::{HEADER_SIZE, MIN_WINDOW_SIZE};
use crate::common::{Error, Result};

use super::cell::read_u32;
use super::header::WindowHeader;
use super::window::Window;

/// Parcel magic bytes.
pub const PARCEL_MAGIC: [u8; 4] = *b"CWIN";

/// Bytes before the window data.
const PARCEL_PREFIX: usize = 12;

/// Bytes after the window data.
const PARCEL_TRAILER: usize = 4;

impl Window {
    /// Serialize the used part of the window.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if the start position does not fit the
    ///   parcel's `u32` field
    pub fn to_parcel(&self) -> Result<Vec<u8>> {
        let start_position = u32::try_from(self.start_position()).map_err(|_| {
            Error::InvalidConfig(format!(
                "start position {} does not fit a window parcel",
                self.start_position()
            ))
        })?;

        let used = self.used_slice();
        let mut out = Vec::with_capacity(PARCEL_PREFIX + used.len() + PARCEL_TRAILER);
        out.extend_from_slice(&PARCEL_MAGIC);
        // Capacity is bounded by u32.
        out.extend_from_slice(&(used.len() as u32).to_le_bytes());
        out.extend_from_slice(&start_position.to_le_bytes());
        out.extend_from_slice(used);

        let checksum = crc32fast::hash(&out);
        out.extend_from_slice(&checksum.to_le_bytes());

        debug!(name = %self.name(), bytes = out.len(), rows = self.num_rows(), "wrote window parcel");
        Ok(out)
    }

    /// Rebuild a read-only window from [`Window::to_parcel`] output.
    ///
    /// # Errors
    /// - `Error::Corrupted` if the magic, length, checksum or header is wrong
    pub fn from_parcel(name: impl Into<String>, parcel: &[u8]) -> Result<Self> {
        let name = name.into();

        if parcel.len() < PARCEL_PREFIX + PARCEL_TRAILER || parcel[..4] != PARCEL_MAGIC {
            return Err(Error::Corrupted("not a window parcel".to_string()));
        }

        let used_len = read_u32(parcel, 4) as usize;
        let start_position = read_u32(parcel, 8) as usize;
        if parcel.len() != PARCEL_PREFIX + used_len + PARCEL_TRAILER {
            return Err(Error::Corrupted(format!(
                "parcel declares {} window bytes but carries {}",
                used_len,
                parcel.len().saturating_sub(PARCEL_PREFIX + PARCEL_TRAILER)
            )));
        }

        let body_end = PARCEL_PREFIX + used_len;
        let stored = read_u32(parcel, body_end);
        let computed = crc32fast::hash(&parcel[..body_end]);
        if stored != computed {
            warn!(%name, stored, computed, "window parcel checksum mismatch");
            return Err(Error::Corrupted(format!(
                "checksum mismatch: stored {:#010x}, computed {:#010x}",
                stored, computed
            )));
        }

        let data = &parcel[PARCEL_PREFIX..body_end];
        if used_len < MIN_WINDOW_SIZE {
            return Err(Error::Corrupted(format!(
                "window of {} bytes is smaller than the minimum {}",
                used_len, MIN_WINDOW_SIZE
            )));
        }

        let header = WindowHeader::from_bytes(data);
        if header.free_offset as usize != used_len || header.first_chunk_offset as usize != HEADER_SIZE
        {
            return Err(Error::Corrupted(format!("inconsistent header {:?}", header)));
        }

        Ok(Window::from_raw_read_only(
            name,
            data.to_vec().into_boxed_slice(),
            start_position,
        ))
    }
}

// ============================================================================
// TESTS
// ============================================================================
