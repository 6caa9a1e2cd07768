//! Utility helpers
//!
//! Logging setup.

pub mod logger;

pub use logger::{init_logger, LogLevel};
