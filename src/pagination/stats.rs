//! Fill statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by a [`Paginator`](super::Paginator).
///
/// All fields are atomic so a paginator can be shared by reference.
/// `Ordering::Relaxed` is enough: the counters are independent and only
/// read for reporting.
///
/// # Example
/// ```
/// use cursorwindow::pagination::FillStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = FillStats::new();
/// stats.fills.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().fills, 1);
/// ```
#[derive(Debug, Default)]
pub struct FillStats {
    /// Completed fills.
    pub fills: AtomicU64,

    /// Rows written into windows.
    pub rows_written: AtomicU64,

    /// Rows seen from cursors.
    pub rows_counted: AtomicU64,

    /// Times a full window was cleared to make room for the required row.
    pub overflow_restarts: AtomicU64,

    /// Rows before the required row that did not fit even alone.
    pub rows_skipped: AtomicU64,

    /// Fills that stopped accepting rows before the cursor ran out.
    pub truncated_fills: AtomicU64,
}

impl FillStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> FillStatsSnapshot {
        FillStatsSnapshot {
            fills: self.fills.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            rows_counted: self.rows_counted.load(Ordering::Relaxed),
            overflow_restarts: self.overflow_restarts.load(Ordering::Relaxed),
            rows_skipped: self.rows_skipped.load(Ordering::Relaxed),
            truncated_fills: self.truncated_fills.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.fills.store(0, Ordering::Relaxed);
        self.rows_written.store(0, Ordering::Relaxed);
        self.rows_counted.store(0, Ordering::Relaxed);
        self.overflow_restarts.store(0, Ordering::Relaxed);
        self.rows_skipped.store(0, Ordering::Relaxed);
        self.truncated_fills.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`FillStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStatsSnapshot {
    pub fills: u64,
    pub rows_written: u64,
    pub rows_counted: u64,
    pub overflow_restarts: u64,
    pub rows_skipped: u64,
    pub truncated_fills: u64,
}

impl FillStatsSnapshot {
    /// Average rows written per fill (0.0 with no fills).
    pub fn rows_per_fill(&self) -> f64 {
        if self.fills == 0 {
            0.0
        } else {
            self.rows_written as f64 / self.fills as f64
        }
    }
}

impl fmt::Display for FillStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fills {{ fills: {}, written: {}, counted: {}, restarts: {}, truncated: {}, rows_per_fill: {:.1} }}",
            self.fills,
            self.rows_written,
            self.rows_counted,
            self.overflow_restarts,
            self.truncated_fills,
            self.rows_per_fill()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = FillStats::new();
        assert_eq!(stats.fills.load(Ordering::Relaxed), 0);
        assert_eq!(stats.snapshot().rows_per_fill(), 0.0);
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = FillStats::new();
        stats.fills.fetch_add(2, Ordering::Relaxed);
        stats.rows_written.fetch_add(7, Ordering::Relaxed);
        stats.overflow_restarts.fetch_add(1, Ordering::Relaxed);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.fills, 2);
        assert_eq!(snapshot.rows_written, 7);
        assert_eq!(snapshot.overflow_restarts, 1);
        assert_eq!(snapshot.rows_per_fill(), 3.5);
    }

    #[test]
    fn test_stats_reset() {
        let stats = FillStats::new();
        stats.rows_counted.fetch_add(100, Ordering::Relaxed);

        stats.reset();

        assert_eq!(stats.rows_counted.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_stats_display() {
        let stats = FillStats::new();
        stats.fills.fetch_add(4, Ordering::Relaxed);
        stats.rows_written.fetch_add(10, Ordering::Relaxed);

        let display = format!("{}", stats.snapshot());
        assert!(display.contains("fills: 4"));
        assert!(display.contains("written: 10"));
        assert!(display.contains("rows_per_fill: 2.5"));
    }
}
