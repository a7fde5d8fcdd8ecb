//! Window - the fixed-capacity result arena.
//!
//! A [`Window`] is a single byte buffer whose size is fixed at creation.
//! Everything inside it is addressed by `u32` offsets:
//!
//! ```text
//! +----------------------+ 0
//! |    Header            |  16 bytes (see header.rs)
//! +----------------------+ 16
//! |    Row Slot Chunk 0  |  100 x u32 row slots + u32 next link
//! +----------------------+ 420
//! |  field slots, string |  appended at free_offset, in allocation
//! |  and blob payloads,  |  order; never moved or overwritten
//! |  further chunks      |
//! +----------------------+ free_offset
//! |    Free Space        |
//! +----------------------+ capacity
//! ```
//!
//! The window never grows. Running out of space is reported as
//! [`Error::OutOfMemory`] and leaves the window untouched.

use std::fmt;

use tracing::trace;

use crate::common::config::{
    WindowConfig, FIELD_SLOT_SIZE, HEADER_SIZE, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE,
    ROW_SLOT_CHUNK_NUM_ROWS, ROW_SLOT_CHUNK_SIZE, ROW_SLOT_SIZE,
};
use crate::common::{Error, Result};

use super::cell::{read_u32, write_u32};
use super::header::WindowHeader;

/// Offset of the next-chunk link inside a row slot chunk.
const CHUNK_NEXT_OFFSET: usize = ROW_SLOT_CHUNK_NUM_ROWS * ROW_SLOT_SIZE;

/// Round up to the 4-byte boundary used for chunks and field arrays.
#[inline]
fn align4(offset: usize) -> usize {
    (offset + 3) & !3
}

/// Undo record for the most recent `alloc_row`.
#[derive(Debug, Clone, Copy)]
struct RowAlloc {
    /// Free offset before the row was allocated.
    free_offset: u32,
    /// Next-link that was patched to point at a freshly allocated chunk.
    chunk_link: Option<u32>,
}

/// A fixed-capacity window of query results.
///
/// # Ownership
/// The window exclusively owns its buffer. Callers only ever see values
/// copied or borrowed through accessor calls, never offsets.
///
/// # Thread Safety
/// Not internally synchronized. Mutation requires `&mut self`; wrap the
/// window in a [`SharedWindow`](super::SharedWindow) to hand completed
/// fills to concurrent readers.
///
/// # Example
/// ```
/// use cursorwindow::Window;
///
/// let mut window = Window::create("contacts", 4096).unwrap();
/// window.set_num_columns(2).unwrap();
/// let row = window.alloc_row().unwrap();
/// window.put_long(row, 0, 42).unwrap();
/// window.put_string(row, 1, "Ada").unwrap();
///
/// assert_eq!(window.get_long(0, 0).unwrap(), 42);
/// assert_eq!(window.get_string(0, 1).unwrap(), "Ada");
/// ```
pub struct Window {
    /// Diagnostic label.
    name: String,

    /// The arena. Its length is the capacity and never changes.
    data: Box<[u8]>,

    /// Read-only windows reject every mutation.
    read_only: bool,

    /// Cursor row index held by window row 0.
    start_position: usize,

    /// Set by `alloc_row`, consumed by `free_last_row`.
    last_alloc: Option<RowAlloc>,
}

impl Window {
    /// Create an empty window with a fixed capacity in bytes.
    ///
    /// # Errors
    /// - `Error::CapacityTooSmall` if `capacity` cannot hold the header and first chunk
    /// - `Error::InvalidConfig` if `capacity` exceeds the 32-bit offset range
    pub fn create(name: impl Into<String>, capacity: usize) -> Result<Self> {
        if capacity < MIN_WINDOW_SIZE {
            return Err(Error::CapacityTooSmall {
                requested: capacity,
                minimum: MIN_WINDOW_SIZE,
            });
        }
        if capacity > MAX_WINDOW_SIZE {
            return Err(Error::InvalidConfig(format!(
                "window capacity {} exceeds the 32-bit offset range",
                capacity
            )));
        }

        let mut window = Self {
            name: name.into(),
            data: vec![0u8; capacity].into_boxed_slice(),
            read_only: false,
            start_position: 0,
            last_alloc: None,
        };
        window.reset_layout();

        trace!(name = %window.name, capacity, "created cursor window");
        Ok(window)
    }

    /// Create a window from a validated [`WindowConfig`].
    pub fn with_config(config: &WindowConfig) -> Result<Self> {
        config.validate()?;
        Self::create(config.name.clone(), config.window_size)
    }

    /// Wrap already laid out bytes as a read-only window.
    ///
    /// The caller has validated the header.
    pub(crate) fn from_raw_read_only(name: String, data: Box<[u8]>, start_position: usize) -> Self {
        Self {
            name,
            data,
            read_only: true,
            start_position,
            last_alloc: None,
        }
    }

    /// Explicitly tear the window down, releasing its buffer.
    pub fn dispose(self) {
        trace!(name = %self.name, "disposed cursor window");
    }

    // ========================================================================
    // Header and metadata
    // ========================================================================

    /// Read the window header.
    #[inline]
    pub(crate) fn header(&self) -> WindowHeader {
        WindowHeader::from_bytes(&self.data)
    }

    #[inline]
    fn set_header(&mut self, header: &WindowHeader) {
        header.write_to(&mut self.data);
    }

    /// Diagnostic label of this window.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes in use (header, chunks, slots and payloads).
    #[inline]
    pub fn used_bytes(&self) -> usize {
        self.header().free_offset as usize
    }

    /// Bytes still available for rows and payloads.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.capacity() - self.used_bytes()
    }

    /// Number of rows currently in the window.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.header().num_rows as usize
    }

    /// Number of columns every row has.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.header().num_columns as usize
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Cursor row index held by window row 0.
    pub fn start_position(&self) -> usize {
        self.start_position
    }

    pub fn set_start_position(&mut self, position: usize) {
        self.start_position = position;
    }

    /// Raw bytes in use, from the header up to the free offset.
    pub(crate) fn used_slice(&self) -> &[u8] {
        &self.data[..self.used_bytes()]
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly(self.name.clone()));
        }
        Ok(())
    }

    // ========================================================================
    // Layout operations
    // ========================================================================

    /// Remove all rows and columns.
    ///
    /// The backing buffer is kept for reuse. Any previously read row or
    /// field position is invalid afterwards.
    ///
    /// # Errors
    /// - `Error::ReadOnly` for read-only windows
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_writable()?;
        self.reset_layout();
        self.start_position = 0;
        Ok(())
    }

    fn reset_layout(&mut self) {
        // Only the first chunk's link needs zeroing; its slots are written
        // before they are ever read.
        let link = HEADER_SIZE + CHUNK_NEXT_OFFSET;
        write_u32(&mut self.data, link, 0);

        self.set_header(&WindowHeader {
            free_offset: MIN_WINDOW_SIZE as u32,
            first_chunk_offset: HEADER_SIZE as u32,
            num_rows: 0,
            num_columns: 0,
        });
        self.last_alloc = None;
    }

    /// Set the column count used to size every subsequent row.
    ///
    /// # Errors
    /// - `Error::ColumnCountLocked` if rows exist and `num_columns` differs
    /// - `Error::ReadOnly` for read-only windows
    /// - `Error::InvalidConfig` if `num_columns` does not fit the `u32` header field
    pub fn set_num_columns(&mut self, num_columns: usize) -> Result<()> {
        self.ensure_writable()?;

        let mut header = self.header();
        let current = header.num_columns as usize;
        if header.num_rows > 0 && current != num_columns {
            return Err(Error::ColumnCountLocked {
                current,
                requested: num_columns,
            });
        }

        // Rows too wide for the capacity surface as OutOfMemory on alloc_row.
        header.num_columns = u32::try_from(num_columns).map_err(|_| {
            Error::InvalidConfig(format!("{} columns exceed the 32-bit column count", num_columns))
        })?;
        self.set_header(&header);
        Ok(())
    }

    /// Append a row with every field set to NULL, returning its index.
    ///
    /// A new row slot chunk is linked in when the last one is full.
    ///
    /// # Errors
    /// - `Error::OutOfMemory` if the chunk and field array do not fit; the
    ///   window is unchanged
    /// - `Error::ReadOnly` for read-only windows
    pub fn alloc_row(&mut self) -> Result<usize> {
        self.ensure_writable()?;

        let mut header = self.header();
        let row = header.num_rows as usize;
        let chunk_index = row / ROW_SLOT_CHUNK_NUM_ROWS;
        let slot_index = row % ROW_SLOT_CHUNK_NUM_ROWS;

        let mut free = header.free_offset as usize;

        // Plan the allocation first so nothing is written on failure.
        let (chunk_offset, new_chunk_link) = if slot_index == 0 && chunk_index > 0 {
            let prev = self.chunk_offset(chunk_index - 1)?;
            let chunk = align4(free);
            free = chunk + ROW_SLOT_CHUNK_SIZE;
            (chunk, Some(prev + CHUNK_NEXT_OFFSET))
        } else {
            (self.chunk_offset(chunk_index)?, None)
        };

        let fields_offset = align4(free);
        let end = fields_offset + header.num_columns as usize * FIELD_SLOT_SIZE;
        if end > self.capacity() {
            return Err(Error::OutOfMemory {
                needed: end - header.free_offset as usize,
                available: self.free_space(),
            });
        }

        // Commit.
        if let Some(link) = new_chunk_link {
            write_u32(&mut self.data, chunk_offset + CHUNK_NEXT_OFFSET, 0);
            write_u32(&mut self.data, link, chunk_offset as u32);
        }
        self.data[fields_offset..end].fill(0);
        write_u32(
            &mut self.data,
            chunk_offset + slot_index * ROW_SLOT_SIZE,
            fields_offset as u32,
        );

        self.last_alloc = Some(RowAlloc {
            free_offset: header.free_offset,
            chunk_link: new_chunk_link.map(|link| link as u32),
        });

        header.num_rows += 1;
        header.free_offset = end as u32;
        self.set_header(&header);

        Ok(row)
    }

    /// Undo the most recent `alloc_row`, together with any payloads
    /// written into that row since.
    ///
    /// # Errors
    /// - `Error::NoRowToFree` if there is no pending allocation to undo
    /// - `Error::ReadOnly` for read-only windows
    pub fn free_last_row(&mut self) -> Result<()> {
        self.ensure_writable()?;

        let alloc = self.last_alloc.take().ok_or(Error::NoRowToFree)?;
        if let Some(link) = alloc.chunk_link {
            write_u32(&mut self.data, link as usize, 0);
        }

        let mut header = self.header();
        header.num_rows -= 1;
        header.free_offset = alloc.free_offset;
        self.set_header(&header);
        Ok(())
    }

    /// Forget the pending row allocation.
    ///
    /// Called when a payload for an older row lands after the last
    /// allocated row, so rewinding would cut into it.
    pub(crate) fn seal_last_alloc(&mut self, row: usize) {
        if row + 1 != self.num_rows() {
            self.last_alloc = None;
        }
    }

    // ========================================================================
    // Slot lookup
    // ========================================================================

    /// Offset of the `chunk_index`-th row slot chunk.
    fn chunk_offset(&self, chunk_index: usize) -> Result<usize> {
        let mut chunk = self.header().first_chunk_offset as usize;
        for _ in 0..chunk_index {
            self.check_range(chunk, ROW_SLOT_CHUNK_SIZE)?;
            chunk = read_u32(&self.data, chunk + CHUNK_NEXT_OFFSET) as usize;
            if chunk == 0 {
                return Err(Error::Corrupted(format!(
                    "row slot chunk {} is not linked",
                    chunk_index
                )));
            }
        }
        self.check_range(chunk, ROW_SLOT_CHUNK_SIZE)?;
        Ok(chunk)
    }

    /// Offset of `row`'s field slot array.
    ///
    /// # Errors
    /// - `Error::IndexOutOfRange` if `row` is not in `[0, num_rows)`
    pub(crate) fn get_row_slot(&self, row: usize) -> Result<usize> {
        let header = self.header();
        if row >= header.num_rows as usize {
            return Err(Error::IndexOutOfRange {
                row,
                column: 0,
                num_rows: header.num_rows as usize,
                num_columns: header.num_columns as usize,
            });
        }

        let chunk = self.chunk_offset(row / ROW_SLOT_CHUNK_NUM_ROWS)?;
        let slot = chunk + (row % ROW_SLOT_CHUNK_NUM_ROWS) * ROW_SLOT_SIZE;
        Ok(read_u32(&self.data, slot) as usize)
    }

    /// Offset of the field slot at (`row`, `column`).
    ///
    /// # Errors
    /// - `Error::IndexOutOfRange` outside `[0, num_rows) x [0, num_columns)`
    pub(crate) fn get_field_slot(&self, row: usize, column: usize) -> Result<usize> {
        let header = self.header();
        let num_columns = header.num_columns as usize;
        if row >= header.num_rows as usize || column >= num_columns {
            return Err(Error::IndexOutOfRange {
                row,
                column,
                num_rows: header.num_rows as usize,
                num_columns,
            });
        }

        let offset = self.get_row_slot(row)? + column * FIELD_SLOT_SIZE;
        self.check_range(offset, FIELD_SLOT_SIZE)?;
        Ok(offset)
    }

    /// Check that `[offset, offset + len)` lies inside the used region.
    pub(crate) fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        let used = self.used_bytes();
        match offset.checked_add(len) {
            Some(end) if offset >= HEADER_SIZE && end <= used => Ok(()),
            _ => Err(Error::Corrupted(format!(
                "range {}+{} outside used region of {} bytes",
                offset, len, used
            ))),
        }
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Advance the free offset after appending `len` bytes at it.
    pub(crate) fn advance_free_offset(&mut self, len: usize) {
        let mut header = self.header();
        header.free_offset += len as u32;
        self.set_header(&header);
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("name", &self.name)
            .field("capacity", &self.capacity())
            .field("header", &self.header())
            .field("read_only", &self.read_only)
            .field("start_position", &self.start_position)
            .finish()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Window {{ name: {}, rows: {}, columns: {}, used: {}/{} }}",
            self.name,
            self.num_rows(),
            self.num_columns(),
            self.used_bytes(),
            self.capacity()
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
