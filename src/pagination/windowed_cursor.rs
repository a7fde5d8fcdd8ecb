//! WindowedCursor - random access over a result set through one window.

use tracing::trace;

use crate::common::{Error, Result};
use crate::cursor::QueryCursor;
use crate::pagination::{pick_fill_start_position, FillStats, Paginator};
use crate::window::{CellRef, FieldType, Window};

/// A scrollable cursor that pages a forward-only query through a window.
///
/// The first call that needs the row count fills the window while counting
/// every row. The number of rows that fit in that first fill is remembered
/// and used to center later refills around the requested position.
///
/// # Position
/// `position()` is `None` before the first row and `Some(count)` after the
/// last one.
///
/// # Example
/// ```
/// use cursorwindow::cursor::MemoryCursor;
/// use cursorwindow::pagination::WindowedCursor;
/// use cursorwindow::{Value, Window};
///
/// let rows = (0..5).map(|i| vec![Value::Integer(i)]).collect();
/// let window = Window::create("numbers", 4096).unwrap();
/// let mut cursor = WindowedCursor::new(MemoryCursor::new(1, rows), window);
///
/// assert_eq!(cursor.count().unwrap(), 5);
/// assert!(cursor.move_to_position(3).unwrap());
/// assert_eq!(cursor.get_long(0).unwrap(), 3);
/// ```
pub struct WindowedCursor<C: QueryCursor> {
    cursor: C,
    window: Window,
    paginator: Paginator,

    /// Total rows, known after the first fill.
    count: Option<usize>,
    /// Rows the first fill managed to hold.
    capacity_rows: usize,
    position: Option<usize>,
}

impl<C: QueryCursor> WindowedCursor<C> {
    pub fn new(cursor: C, window: Window) -> Self {
        Self {
            cursor,
            window,
            paginator: Paginator::new(),
            count: None,
            capacity_rows: 0,
            position: None,
        }
    }

    /// Total number of rows in the result set.
    ///
    /// The first call fills the window and drains the query.
    pub fn count(&mut self) -> Result<usize> {
        match self.count {
            Some(count) => Ok(count),
            None => {
                self.fill_window(0)?;
                Ok(self.count.unwrap_or(0))
            }
        }
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn column_count(&self) -> usize {
        self.cursor.column_count()
    }

    /// Move to `position`, refilling the window if it does not hold the row.
    ///
    /// Returns false and parks after the last row if `position` is past the
    /// end. A failed refill moves the cursor before the first row.
    pub fn move_to_position(&mut self, position: usize) -> Result<bool> {
        let count = self.count()?;
        if position >= count {
            self.position = Some(count);
            return Ok(false);
        }

        if !self.window_holds(position) {
            if let Err(e) = self.fill_window(position) {
                self.position = None;
                return Err(e);
            }
        }
        self.position = Some(position);
        Ok(true)
    }

    pub fn move_to_first(&mut self) -> Result<bool> {
        self.move_to_position(0)
    }

    pub fn move_to_next(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.move_to_position(next)
    }

    pub fn move_to_previous(&mut self) -> Result<bool> {
        match self.position {
            None | Some(0) => {
                self.position = None;
                Ok(false)
            }
            Some(p) => self.move_to_position(p - 1),
        }
    }

    pub fn get_type(&self, column: usize) -> Result<FieldType> {
        self.window.get_type(self.window_row()?, column)
    }

    pub fn is_null(&self, column: usize) -> Result<bool> {
        self.window.is_null(self.window_row()?, column)
    }

    pub fn get_long(&self, column: usize) -> Result<i64> {
        self.window.get_long(self.window_row()?, column)
    }

    pub fn get_double(&self, column: usize) -> Result<f64> {
        self.window.get_double(self.window_row()?, column)
    }

    pub fn get_string(&self, column: usize) -> Result<&str> {
        self.window.get_string(self.window_row()?, column)
    }

    pub fn get_blob(&self, column: usize) -> Result<&[u8]> {
        self.window.get_blob(self.window_row()?, column)
    }

    pub fn get_value(&self, column: usize) -> Result<CellRef<'_>> {
        self.window.get_value(self.window_row()?, column)
    }

    /// The window as of the last fill.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn stats(&self) -> &FillStats {
        self.paginator.stats()
    }

    /// Give back the query cursor and the window.
    pub fn into_parts(self) -> (C, Window) {
        (self.cursor, self.window)
    }

    fn fill_window(&mut self, required_pos: usize) -> Result<()> {
        match self.count {
            None => {
                let start = pick_fill_start_position(required_pos, 0);
                let result = self.paginator.fill(
                    &mut self.cursor,
                    &mut self.window,
                    start,
                    required_pos,
                    true,
                )?;
                self.count = Some(result.counted_rows);
                self.capacity_rows = self.window.num_rows();
            }
            Some(_) => {
                let start = pick_fill_start_position(required_pos, self.capacity_rows);
                trace!(window = %self.window.name(), required_pos, start, "refilling window");
                self.paginator.fill(
                    &mut self.cursor,
                    &mut self.window,
                    start,
                    required_pos,
                    false,
                )?;
            }
        }
        Ok(())
    }

    fn window_holds(&self, position: usize) -> bool {
        let start = self.window.start_position();
        position >= start && position < start + self.window.num_rows()
    }

    /// Window row of the current position.
    fn window_row(&self) -> Result<usize> {
        match self.position {
            Some(p) if self.window_holds(p) => Ok(p - self.window.start_position()),
            _ => Err(Error::NoCurrentRow),
        }
    }
}
