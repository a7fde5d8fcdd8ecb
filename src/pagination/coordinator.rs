//! Paginator - fills a window from a query cursor under a capacity bound.
//!
//! The [`Paginator`] provides:
//! - Row-by-row copying from a [`QueryCursor`] into a [`Window`]
//! - Overflow recovery that always keeps the required row
//! - Optional draining of the cursor to count every row
//! - Fill statistics

use std::sync::atomic::Ordering;

use tracing::{debug, trace, warn};

use crate::common::{Error, Result};
use crate::cursor::{QueryCursor, StepResult};
use crate::pagination::FillStats;
use crate::window::{FieldType, Window};

/// Outcome of a fill: the `(start_pos, counted_rows)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillResult {
    /// Cursor row index held by window row 0.
    pub start_pos: usize,
    /// Every row the cursor produced when counting all rows, otherwise
    /// one past the last row written.
    pub counted_rows: usize,
}

/// Pick a fill start position around `required_pos`.
///
/// A third of the window's estimated capacity goes to rows before the
/// required one and the rest to rows after it. `capacity_rows` is 0 when
/// unknown, which starts the fill at the required row.
///
/// # Example
/// ```
/// use cursorwindow::pagination::pick_fill_start_position;
///
/// assert_eq!(pick_fill_start_position(100, 30), 90);
/// assert_eq!(pick_fill_start_position(5, 30), 0);
/// ```
pub fn pick_fill_start_position(required_pos: usize, capacity_rows: usize) -> usize {
    required_pos.saturating_sub(capacity_rows / 3)
}

/// Drives query cursors into windows.
///
/// # Recovery policy
/// ```text
///  cursor rows:  0 1 2 3 4 5 6 7 8 9        required = 7, window fits 3
///
///  fill          [0 1 2]                    row 3 overflows, 3 <= 7
///  restart             [3 4 5]              row 6 overflows, 6 <= 7
///  restart                   [6 7 8]        row 9 overflows, 9 > 7: stop
///
///  result: start_pos = 6, counted_rows = 9 (or 10 when counting all)
/// ```
///
/// Rows before the final start position are never re-materialized.
#[derive(Debug, Default)]
pub struct Paginator {
    stats: FillStats,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill statistics.
    pub fn stats(&self) -> &FillStats {
        &self.stats
    }

    /// Clear `window` and fill it from `cursor`.
    ///
    /// Rows before `start_pos` are skipped. Row `required_pos` is in the
    /// window on return whenever the cursor produces it. With
    /// `count_all_rows`, the cursor is drained after the window is full so
    /// that `counted_rows` is the full result size.
    ///
    /// The cursor is reset before returning, on success and on failure. A
    /// failed fill leaves a writable window empty.
    ///
    /// # Errors
    /// - `Error::InvalidFillRange` if `required_pos < start_pos`
    /// - `Error::RowTooLarge` if the required row does not fit an empty window
    /// - `Error::Cursor` for step or reset failures, passed through verbatim
    /// - any non-capacity window error
    pub fn fill<C: QueryCursor + ?Sized>(
        &self,
        cursor: &mut C,
        window: &mut Window,
        start_pos: usize,
        required_pos: usize,
        count_all_rows: bool,
    ) -> Result<FillResult> {
        if required_pos < start_pos {
            return Err(Error::InvalidFillRange {
                start: start_pos,
                required: required_pos,
            });
        }

        let outcome = self.fill_rows(cursor, window, start_pos, required_pos, count_all_rows);
        let reset = cursor.reset();

        let result = match (outcome, reset) {
            (Ok(result), Ok(())) => result,
            (Ok(_), Err(reset_err)) => {
                discard_fill(window);
                return Err(reset_err.into());
            }
            (Err(e), reset) => {
                if let Err(reset_err) = reset {
                    warn!(window = %window.name(), error = %reset_err, "cursor reset failed after aborted fill");
                }
                discard_fill(window);
                return Err(e);
            }
        };

        window.set_start_position(result.start_pos);
        self.stats.fills.fetch_add(1, Ordering::Relaxed);
        self.stats
            .rows_counted
            .fetch_add(result.counted_rows as u64, Ordering::Relaxed);

        debug!(
            window = %window.name(),
            start_pos,
            actual_pos = result.start_pos,
            filled_rows = window.num_rows(),
            counted_rows = result.counted_rows,
            "filled cursor window"
        );
        Ok(result)
    }

    fn fill_rows<C: QueryCursor + ?Sized>(
        &self,
        cursor: &mut C,
        window: &mut Window,
        start_pos: usize,
        required_pos: usize,
        count_all_rows: bool,
    ) -> Result<FillResult> {
        prepare_window(window, &*cursor)?;

        let mut n_row = 0;
        let mut i_start = start_pos;
        let mut accepting = true;

        while cursor.step()? == StepResult::Row {
            if n_row >= i_start && accepting {
                match copy_row(&*cursor, window) {
                    Ok(()) => self.record_written(),
                    Err(e) if e.is_out_of_memory() => {
                        let placed = n_row <= required_pos
                            && self.restart_at(&*cursor, window, n_row, required_pos, &mut i_start)?;

                        if !placed {
                            accepting = false;
                            self.stats.truncated_fills.fetch_add(1, Ordering::Relaxed);
                            if !count_all_rows {
                                break;
                            }
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            n_row += 1;
        }

        Ok(FillResult {
            start_pos: i_start,
            counted_rows: n_row,
        })
    }

    /// Clear the window and retry the current row as window row 0.
    ///
    /// Returns true when the fill can keep going. A row before the required
    /// one that does not fit alone is dropped and the window restarts after
    /// it; the required row not fitting alone is an error.
    fn restart_at<C: QueryCursor + ?Sized>(
        &self,
        cursor: &C,
        window: &mut Window,
        n_row: usize,
        required_pos: usize,
        i_start: &mut usize,
    ) -> Result<bool> {
        prepare_window(window, cursor)?;
        *i_start = n_row;
        self.stats.overflow_restarts.fetch_add(1, Ordering::Relaxed);
        trace!(window = %window.name(), row = n_row, required_pos, "window full, restarting fill");

        match copy_row(cursor, window) {
            Ok(()) => {
                self.record_written();
                Ok(true)
            }
            Err(e) if e.is_out_of_memory() => {
                if n_row == required_pos {
                    return Err(Error::RowTooLarge {
                        row: n_row,
                        capacity: window.capacity(),
                    });
                }
                warn!(window = %window.name(), row = n_row, "row does not fit an empty window, skipping");
                *i_start = n_row + 1;
                self.stats.rows_skipped.fetch_add(1, Ordering::Relaxed);
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    #[inline]
    fn record_written(&self) {
        self.stats.rows_written.fetch_add(1, Ordering::Relaxed);
    }
}

/// Drop the rows of a fill that did not complete.
fn discard_fill(window: &mut Window) {
    if window.clear().is_err() {
        trace!(window = %window.name(), "aborted fill left read-only window untouched");
    }
}

/// Clear the window and size it to the cursor's projection.
fn prepare_window<C: QueryCursor + ?Sized>(window: &mut Window, cursor: &C) -> Result<()> {
    window.clear()?;
    window.set_num_columns(cursor.column_count())
}

/// Append the cursor's current row to the window.
///
/// On failure the partially written row is freed again.
fn copy_row<C: QueryCursor + ?Sized>(cursor: &C, window: &mut Window) -> Result<()> {
    let row = window.alloc_row()?;

    let written = (0..window.num_columns()).try_for_each(|column| match cursor.column_type(column) {
        FieldType::Null => window.put_null(row, column),
        FieldType::Integer => window.put_long(row, column, cursor.column_long(column)),
        FieldType::Float => window.put_double(row, column, cursor.column_double(column)),
        FieldType::String => window.put_string(row, column, cursor.column_text(column)),
        FieldType::Blob => window.put_blob(row, column, cursor.column_blob(column)),
    });

    if let Err(e) = written {
        window.free_last_row()?;
        return Err(e);
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
