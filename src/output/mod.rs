//! Output formatting module
//!
//! Provides text and JSON output for command results.

mod formatter;

pub use formatter::{FixtureEntry, OutputFormat, ParallelDecision, ResultFormatter};
