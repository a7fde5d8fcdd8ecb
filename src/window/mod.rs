//! Window layer - the bounded result arena and its cell encoding.
//!
//! This module contains:
//! - [`Window`] - The fixed-capacity arena with its row slot directory
//! - [`WindowHeader`] - Metadata at the start of every window
//! - [`FieldSlot`] / [`FieldType`] - Cell encoding
//! - [`Value`] / [`CellRef`] - Owned and borrowed cell values
//! - [`SharedWindow`] - Lock-protected handle for concurrent readers

mod accessors;
mod cell;
mod header;
mod parcel;
mod shared;
#[allow(clippy::module_inception)]
mod window;

pub use cell::{CellRef, FieldSlot, FieldType, Value};
pub use header::WindowHeader;
pub use parcel::PARCEL_MAGIC;
pub use shared::SharedWindow;
pub use window::Window;
