//! Configuration constants and window settings for cursorwindow.

use crate::common::error::{Error, Result};

/// Default size of a cursor window in bytes (2MB).
///
/// Large enough to hold a few thousand typical rows while keeping a
/// single page of results comfortably bounded.
pub const DEFAULT_WINDOW_SIZE: usize = 2 * 1024 * 1024;

/// Number of row slots in one row slot chunk.
pub const ROW_SLOT_CHUNK_NUM_ROWS: usize = 100;

/// Size of the window header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Size of one row slot (a `u32` field-array offset).
pub const ROW_SLOT_SIZE: usize = 4;

/// Size of a row slot chunk: the slots plus the `u32` next-chunk link.
pub const ROW_SLOT_CHUNK_SIZE: usize = ROW_SLOT_CHUNK_NUM_ROWS * ROW_SLOT_SIZE + 4;

/// Size of one field slot (`u32` type, `u32` reserved, 8 bytes of data).
pub const FIELD_SLOT_SIZE: usize = 16;

/// Smallest capacity a window can be created with: header plus first chunk.
pub const MIN_WINDOW_SIZE: usize = HEADER_SIZE + ROW_SLOT_CHUNK_SIZE;

/// Largest capacity a window can be created with (offsets are `u32`).
pub const MAX_WINDOW_SIZE: usize = u32::MAX as usize;

/// Settings used to create a window.
///
/// # Example
/// ```
/// use cursorwindow::common::config::WindowConfig;
///
/// let config = WindowConfig::new("contacts").with_window_size(64 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Diagnostic label for the window.
    pub name: String,
    /// Window capacity in bytes.
    pub window_size: usize,
}

impl WindowConfig {
    /// Creates a configuration with the default window size.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Sets the window capacity in bytes.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(Error::CapacityTooSmall {
                requested: self.window_size,
                minimum: MIN_WINDOW_SIZE,
            });
        }
        if self.window_size > MAX_WINDOW_SIZE {
            return Err(Error::InvalidConfig(format!(
                "window_size {} exceeds the 32-bit offset range",
                self.window_size
            )));
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("<unnamed>")
    }
}
