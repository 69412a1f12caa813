//! Error types for loading and indexing

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for csv-rescue operations
pub type Result<T> = std::result::Result<T, RescueError>;

/// Errors that can stop a load.
///
/// Structurally odd CSV (ragged rows, unclosed quotes, stray line breaks) is
/// never an error; only running out of memory or having nothing to read is.
#[derive(Debug, Error)]
pub enum RescueError {
    /// A buffer could not grow, either because the allocator refused or
    /// because the configured memory limit would be exceeded
    #[error("allocation failed while growing {what} (requested {requested} more)")]
    AllocationFailure {
        /// Which buffer was growing
        what: &'static str,
        /// Additional capacity that was asked for
        requested: usize,
    },

    /// The input buffer was empty
    #[error("input is empty")]
    EmptyInput,

    /// The input file could not be opened or read
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RescueError {
    pub(crate) fn alloc(what: &'static str, requested: usize) -> Self {
        RescueError::AllocationFailure { what, requested }
    }

    /// True for failures detected before any parsing started
    pub fn is_input_unavailable(&self) -> bool {
        matches!(self, RescueError::EmptyInput | RescueError::Io { .. })
    }

    /// True when a growth operation failed mid-parse
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, RescueError::AllocationFailure { .. })
    }
}
