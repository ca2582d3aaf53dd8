//! Error types for region handling

use thiserror::Error;

/// Result type for region operations
pub type Result<T> = std::result::Result<T, RegionError>;

/// Region error types
#[derive(Error, Debug)]
pub enum RegionError {
    /// Cursor error
    #[error("cursor error: {0}")]
    Io(#[from] lce_io::IoError),

    /// Chunk codec error
    #[error("chunk error: {0}")]
    Chunk(#[from] lce_chunk::ChunkError),

    /// zlib failure on a chunk record
    #[error("zlib error: {0}")]
    Zlib(#[from] std::io::Error),

    /// Slot coordinates outside the 32×32 directory
    #[error("slot ({x}, {z}) outside the 32x32 directory")]
    SlotOutOfBounds { x: usize, z: usize },
}
