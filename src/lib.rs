//! cursorwindow - A bounded tabular result window with overflow-recovering pagination.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          cursorwindow                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │         Query Cursor (cursor/)  [external engine]        │   │
//! │  │        step → column_type/long/double/text/blob          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Pagination Layer (pagination/)                │   │
//! │  │   Paginator (fill + overflow restart) + FillStats        │   │
//! │  │   WindowedCursor (count, move_to_position, getters)      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Window Layer (window/)                      │   │
//! │  │   Header + Row Slot Chunks + Field Slots + Payloads      │   │
//! │  │   typed put/get, parcel snapshots, SharedWindow          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (Error, config)
//! - [`window`] - The fixed-capacity arena and its cell encoding
//! - [`cursor`] - The query cursor seam and an in-memory cursor
//! - [`pagination`] - Filling windows from cursors
//!
//! # Quick Start
//! ```
//! use cursorwindow::cursor::MemoryCursor;
//! use cursorwindow::{Paginator, Value, Window};
//!
//! let rows = (0..100).map(|i| vec![Value::Integer(i), Value::from("row")]).collect();
//! let mut cursor = MemoryCursor::new(2, rows);
//! let mut window = Window::create("results", 64 * 1024).unwrap();
//!
//! let result = Paginator::new()
//!     .fill(&mut cursor, &mut window, 0, 0, true)
//!     .unwrap();
//! assert_eq!(result.counted_rows, 100);
//! assert_eq!(window.get_long(42, 0).unwrap(), 42);
//! ```

pub mod common;
pub mod cursor;
pub mod pagination;
pub mod window;

// Re-export commonly used items at crate root for convenience
pub use common::config::DEFAULT_WINDOW_SIZE;
pub use common::{Error, Result, WindowConfig};

pub use cursor::{CursorError, QueryCursor, StepResult};
pub use pagination::{FillResult, FillStats, Paginator, WindowedCursor};
pub use window::{CellRef, FieldType, SharedWindow, Value, Window};
