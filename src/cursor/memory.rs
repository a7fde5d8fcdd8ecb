//! MemoryCursor - a query cursor over rows held in memory.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{CursorError, QueryCursor, StepResult};
use crate::window::{FieldType, Value};

/// A cloneable flag that cancels the cursor it was taken from.
///
/// The next `step` after `cancel()` fails with [`CursorError::Canceled`].
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    canceled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    /// Clear the flag so the cursor can run again.
    pub fn reset(&self) {
        self.canceled.store(false, Ordering::Relaxed);
    }
}

/// A forward-only cursor over a fixed set of rows.
///
/// Column readers coerce the way a SQL engine does: reading an INTEGER as
/// a double widens it, reading a FLOAT as a long truncates it, and reading
/// NULL yields zero or empty.
///
/// # Example
/// ```
/// use cursorwindow::cursor::{MemoryCursor, QueryCursor, StepResult};
/// use cursorwindow::Value;
///
/// let mut cursor = MemoryCursor::new(1, vec![vec![Value::Integer(5)]]);
/// assert_eq!(cursor.step().unwrap(), StepResult::Row);
/// assert_eq!(cursor.column_long(0), 5);
/// assert_eq!(cursor.step().unwrap(), StepResult::Done);
/// ```
#[derive(Debug)]
pub struct MemoryCursor {
    num_columns: usize,
    rows: Vec<Vec<Value>>,

    /// Index of the current row, `None` before the first step.
    position: Option<usize>,
    done: bool,

    /// Injected failure for the step that would produce this row.
    fail_at_row: Option<(usize, CursorError)>,
    /// Injected failure for every `reset`.
    reset_failure: Option<CursorError>,
    cancel: CancelHandle,

    steps: usize,
    resets: usize,
}

impl MemoryCursor {
    /// Create a cursor over `rows`, each holding `num_columns` values.
    ///
    /// # Panics
    /// Panics if a row has a different number of values.
    pub fn new(num_columns: usize, rows: Vec<Vec<Value>>) -> Self {
        assert!(
            rows.iter().all(|r| r.len() == num_columns),
            "every row must have {} values",
            num_columns
        );

        Self {
            num_columns,
            rows,
            position: None,
            done: false,
            fail_at_row: None,
            reset_failure: None,
            cancel: CancelHandle::new(),
            steps: 0,
            resets: 0,
        }
    }

    /// Fail the step that would produce row `row`.
    pub fn with_failure_at(mut self, row: usize, error: CursorError) -> Self {
        self.fail_at_row = Some((row, error));
        self
    }

    /// Fail every `reset` with `error`.
    pub fn with_reset_failure(mut self, error: CursorError) -> Self {
        self.reset_failure = Some(error);
        self
    }

    /// Handle that cancels this cursor from anywhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Total rows in the result set.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of `step` calls so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of `reset` calls so far.
    pub fn resets(&self) -> usize {
        self.resets
    }

    fn current(&self, column: usize) -> Option<&Value> {
        self.position
            .and_then(|p| self.rows.get(p))
            .and_then(|row| row.get(column))
    }
}

impl QueryCursor for MemoryCursor {
    fn step(&mut self) -> Result<StepResult, CursorError> {
        self.steps += 1;

        if self.cancel.is_canceled() {
            return Err(CursorError::Canceled);
        }
        if self.done {
            return Err(CursorError::Misuse("step after done without reset".to_string()));
        }

        let next = self.position.map_or(0, |p| p + 1);
        if let Some((row, error)) = &self.fail_at_row {
            if *row == next {
                return Err(error.clone());
            }
        }

        if next < self.rows.len() {
            self.position = Some(next);
            Ok(StepResult::Row)
        } else {
            self.position = None;
            self.done = true;
            Ok(StepResult::Done)
        }
    }

    fn column_count(&self) -> usize {
        self.num_columns
    }

    fn column_type(&self, column: usize) -> FieldType {
        self.current(column).map_or(FieldType::Null, Value::field_type)
    }

    fn column_long(&self, column: usize) -> i64 {
        match self.current(column) {
            Some(Value::Integer(v)) => *v,
            Some(Value::Float(v)) => *v as i64,
            _ => 0,
        }
    }

    fn column_double(&self, column: usize) -> f64 {
        match self.current(column) {
            Some(Value::Float(v)) => *v,
            Some(Value::Integer(v)) => *v as f64,
            _ => 0.0,
        }
    }

    fn column_text(&self, column: usize) -> &str {
        match self.current(column) {
            Some(Value::Text(s)) => s,
            _ => "",
        }
    }

    fn column_blob(&self, column: usize) -> &[u8] {
        match self.current(column) {
            Some(Value::Blob(b)) => b,
            Some(Value::Text(s)) => s.as_bytes(),
            _ => &[],
        }
    }

    fn reset(&mut self) -> Result<(), CursorError> {
        self.resets += 1;
        self.position = None;
        self.done = false;

        match &self.reset_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
