//! Error types
//!
//! Errors surfaced by tree construction, export and parallel resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::NodeKind;

/// Suite inspection errors
#[derive(Error, Debug)]
pub enum SuiteError {
    /// A test node has no enclosing fixture; the tree invariant is broken.
    #[error("Test has no enclosing fixture: {0}")]
    OrphanTest(String),

    #[error("Duplicate full name in tree: {0}")]
    DuplicateFullName(String),

    #[error("Invalid child of {parent}: {child} is a {kind}, expected a test method")]
    InvalidChildKind {
        parent: String,
        child: String,
        kind: NodeKind,
    },

    #[error("Node index {0} is out of range")]
    UnknownNode(usize),

    #[error("No test named {0}")]
    UnknownTest(String),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write export: {0}")]
    Csv(#[from] csv::Error),

    /// An unquoted export cell would break the row structure.
    #[error("Cannot export {0:?}: tabs and line breaks are only allowed in property values")]
    UnsafeCell(String),

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl SuiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SuiteError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type using [`SuiteError`]
pub type Result<T> = std::result::Result<T, SuiteError>;
