//! Error types for cursorwindow.

use thiserror::Error;

use crate::cursor::CursorError;
use crate::window::FieldType;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in cursorwindow.
///
/// `OutOfMemory` is the only kind that is expected during normal operation:
/// the pagination coordinator catches it and decides how to recover. Every
/// other kind propagates unchanged to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Window construction requested fewer bytes than the header needs.
    #[error("window capacity {requested} is below the minimum of {minimum} bytes")]
    CapacityTooSmall { requested: usize, minimum: usize },

    /// A put or alloc did not fit in the remaining capacity.
    ///
    /// Recoverable. The window is left exactly as it was before the call.
    #[error("window full: needed {needed} bytes, {available} available")]
    OutOfMemory { needed: usize, available: usize },

    /// Row or column address outside the current bounds.
    #[error("cell ({row}, {column}) out of range for {num_rows} rows x {num_columns} columns")]
    IndexOutOfRange {
        row: usize,
        column: usize,
        num_rows: usize,
        num_columns: usize,
    },

    /// Typed getter called against an incompatible stored tag.
    #[error("cell ({row}, {column}) holds {actual}, not {requested}")]
    TypeMismatch {
        row: usize,
        column: usize,
        requested: FieldType,
        actual: FieldType,
    },

    /// Column count change attempted on a window that already has rows.
    #[error("window has rows with {current} columns, cannot switch to {requested}")]
    ColumnCountLocked { current: usize, requested: usize },

    /// `free_last_row` called with no freshly allocated row to undo.
    #[error("no freshly allocated row to free")]
    NoRowToFree,

    /// Mutation attempted on a read-only window.
    #[error("window '{0}' is read-only")]
    ReadOnly(String),

    /// Fill requested with the required row before the start row.
    #[error("required row {required} precedes start row {start}")]
    InvalidFillRange { start: usize, required: usize },

    /// The required row does not fit even in an empty window.
    #[error("row {row} does not fit in an empty window of {capacity} bytes")]
    RowTooLarge { row: usize, capacity: usize },

    /// Column read through a windowed cursor that is not on a row.
    #[error("cursor is not positioned on a row")]
    NoCurrentRow,

    /// Window bytes failed validation.
    #[error("corrupted window data: {0}")]
    Corrupted(String),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error reported by the query cursor, passed through verbatim.
    #[error("cursor error: {0}")]
    Cursor(#[from] CursorError),
}

impl Error {
    /// Returns true for the recoverable capacity-exhausted kind.
    #[inline]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Error::OutOfMemory { .. })
    }
}
