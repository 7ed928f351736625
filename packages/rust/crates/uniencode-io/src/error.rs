//! Error types for file I/O operations.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Error types for file I/O operations.
///
/// Each variant represents a specific failure mode in the I/O pipeline.
#[derive(Error, Debug)]
pub enum IoError {
    /// File does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Path exists but is a directory, device or other non-regular entry.
    #[error("Not a regular file: {0}")]
    NotRegularFile(String),

    /// Path is a symbolic link; links are never rewritten.
    #[error("Refusing to follow symbolic link: {0}")]
    Symlink(String),

    /// File exceeds size limit.
    #[error("File too large: {0} bytes (limit: {1})")]
    TooLarge(u64, u64),

    /// External content probe (`file(1)`) could not be run or failed.
    #[error("Content probe failed for {path}: {message}")]
    Probe {
        /// File being probed.
        path: String,
        /// Probe failure description.
        message: String,
    },

    /// Temporary file could not be renamed over the original.
    #[error("Failed to replace {path}: {source}")]
    Persist {
        /// Destination that was left untouched.
        path: String,
        /// Underlying rename failure.
        #[source]
        source: std::io::Error,
    },

    /// Low-level I/O error from std::io.
    #[error("IO error: {0}")]
    System(#[from] std::io::Error),
}
