//! Query cursor - the row source a window is filled from.
//!
//! The query engine itself lives outside this crate. It is seen through
//! the [`QueryCursor`] trait: a forward-only cursor that produces one row
//! at a time and can be rewound with [`QueryCursor::reset`].
//!
//! [`MemoryCursor`] is an in-memory implementation used by tests,
//! benchmarks and callers that already hold their rows.

mod memory;

use thiserror::Error;

use crate::window::FieldType;

pub use memory::{CancelHandle, MemoryCursor};

/// Outcome of a successful [`QueryCursor::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A row is available through the column readers.
    Row,
    /// The result set is exhausted.
    Done,
}

/// Errors reported by a query cursor.
///
/// These pass through the pagination coordinator unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The query engine failed while producing a row.
    #[error("query failed (code {code}): {message}")]
    Failed { code: i32, message: String },

    /// The query was canceled by its owner.
    #[error("query canceled")]
    Canceled,

    /// The cursor was used out of order.
    #[error("cursor misuse: {0}")]
    Misuse(String),
}

/// A forward-only cursor over query results.
///
/// Column readers describe the row produced by the last `step` that
/// returned [`StepResult::Row`]. After `reset`, the next `step` starts
/// over from the first row.
pub trait QueryCursor {
    /// Advance to the next row.
    fn step(&mut self) -> Result<StepResult, CursorError>;

    /// Number of columns in the projection.
    fn column_count(&self) -> usize;

    /// Type of `column` in the current row.
    fn column_type(&self, column: usize) -> FieldType;

    fn column_long(&self, column: usize) -> i64;

    fn column_double(&self, column: usize) -> f64;

    fn column_text(&self, column: usize) -> &str;

    fn column_blob(&self, column: usize) -> &[u8];

    /// Rewind to before the first row. Reports any error the query hit.
    fn reset(&mut self) -> Result<(), CursorError>;
}

impl<C: QueryCursor + ?Sized> QueryCursor for &mut C {
    fn step(&mut self) -> Result<StepResult, CursorError> {
        (**self).step()
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn column_type(&self, column: usize) -> FieldType {
        (**self).column_type(column)
    }

    fn column_long(&self, column: usize) -> i64 {
        (**self).column_long(column)
    }

    fn column_double(&self, column: usize) -> f64 {
        (**self).column_double(column)
    }

    fn column_text(&self, column: usize) -> &str {
        (**self).column_text(column)
    }

    fn column_blob(&self, column: usize) -> &[u8] {
        (**self).column_blob(column)
    }

    fn reset(&mut self) -> Result<(), CursorError> {
        (**self).reset()
    }
}
