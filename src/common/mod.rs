//! Common types and utilities shared across cursorwindow.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`WindowConfig`](config::WindowConfig)
//! - Error types

pub mod config;
pub mod error;

pub use config::WindowConfig;
pub use error::{Error, Result};
