//! Error types for STFS parsing

use thiserror::Error;

/// Result type for STFS operations
pub type Result<T> = std::result::Result<T, StfsError>;

/// STFS error types
#[derive(Error, Debug)]
pub enum StfsError {
    /// Cursor error
    #[error("cursor error: {0}")]
    Io(#[from] lce_io::IoError),

    /// Block number outside the allocated range or the 24-bit space
    #[error("reference to illegal block number {block:#x} (allocated: {alloc:#x})")]
    IllegalBlock { block: u32, alloc: u32 },

    /// Package is not an STFS-framed savegame
    #[error("not an STFS savegame: {0}")]
    NotASavegame(&'static str),

    /// Allocated block count beyond what a three-level hash tree can address
    #[error("invalid allocated block count: {0:#x}")]
    InvalidBlockCount(u32),

    /// The package carries no savegame.dat entry
    #[error("package contains no savegame.dat entry")]
    MissingSavegame,
}
