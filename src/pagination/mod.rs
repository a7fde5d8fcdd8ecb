//! Pagination layer - filling windows from query cursors.
//!
//! This module contains:
//! - [`Paginator`] - The fill algorithm with overflow recovery
//! - [`FillStats`] - Counters kept across fills
//! - [`WindowedCursor`] - Scrollable access to a whole result set through one window

mod coordinator;
mod stats;
mod windowed_cursor;

pub use coordinator::{pick_fill_start_position, FillResult, Paginator};
pub use stats::{FillStats, FillStatsSnapshot};
pub use windowed_cursor::WindowedCursor;
