//! Error types for archive handling

use thiserror::Error;

/// Result type for archive operations
pub type Result<T> = std::result::Result<T, SaveError>;

/// Archive error types
#[derive(Error, Debug)]
pub enum SaveError {
    /// Cursor error
    #[error("cursor error: {0}")]
    Io(#[from] lce_io::IoError),

    /// Region conversion error
    #[error("region error: {0}")]
    Region(#[from] lce_region::RegionError),

    /// STFS package error
    #[error("STFS error: {0}")]
    Stfs(#[from] lce_stfs::StfsError),

    /// Console name did not parse
    #[error("unknown console: {0:?}")]
    UnknownConsole(String),

    /// Filesystem failure while dumping inner files
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
}
