//! Error types for the tree-grid model.

use std::path::PathBuf;

/// Result type alias for tree-grid operations.
pub type Result<T> = std::result::Result<T, TreeGridError>;

/// Errors that can occur in the tree-grid model.
///
/// None of these are meant for end users. The grid logs them and degrades:
/// dangling rows are demoted to roots, interactions on bad rows are ignored
/// by the view.
#[derive(Debug, thiserror::Error)]
pub enum TreeGridError {
    /// A row index outside the current store.
    #[error("row index {index} out of range (store has {len} rows)")]
    OutOfRange { index: usize, len: usize },

    /// A child row whose parent index does not name another row.
    #[error("row {row} references parent {parent}, which does not exist")]
    DanglingParentReference { row: usize, parent: usize },

    /// A row that can never reach a root by following parents.
    #[error("row {row} is part of a parent cycle")]
    ParentCycle { row: usize },

    /// A text filter pattern that is not a valid regular expression.
    #[error("invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Configuration file could not be read or written.
    #[error("failed to access configuration '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration text could not be parsed or serialized.
    #[error("invalid configuration: {message}")]
    ConfigParse { message: String },
}

impl TreeGridError {
    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    /// Create a dangling-parent error.
    pub fn dangling_parent(row: usize, parent: usize) -> Self {
        Self::DanglingParentReference { row, parent }
    }

    /// Create an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a configuration I/O error.
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration parse error.
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }
}
