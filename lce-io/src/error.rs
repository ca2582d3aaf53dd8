//! Error types for cursor operations

use thiserror::Error;

/// Result type for cursor operations
pub type Result<T> = std::result::Result<T, IoError>;

/// Cursor error types
#[derive(Error, Debug)]
pub enum IoError {
    /// Access past the end of the underlying buffer
    #[error("access of {len} bytes at offset {offset} past end of buffer ({size} bytes)")]
    OutOfRange {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// Malformed UTF-16 string data
    #[error("invalid UTF-16 string data at offset {0}")]
    InvalidString(usize),
}
