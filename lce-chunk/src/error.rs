//! Error types for chunk decoding and encoding

use thiserror::Error;

/// Result type for chunk operations
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Chunk error types
#[derive(Error, Debug)]
pub enum ChunkError {
    /// Cursor error
    #[error("cursor error: {0}")]
    Io(#[from] lce_io::IoError),

    /// NBT error in the chunk tail
    #[error("NBT error: {0}")]
    Nbt(#[from] lce_nbt::NbtError),

    /// Grid format nibble outside the known set
    #[error("invalid grid format tag: {0:#03x}")]
    InvalidFormatTag(u8),

    /// Decoded position index beyond the palette
    #[error("palette index {index} out of range for palette of {size}")]
    PaletteIndexOverflow { index: usize, size: usize },

    /// Chunk record version word is neither 12 nor 13
    #[error("unsupported chunk version: {0}")]
    UnsupportedVersion(u16),
}
