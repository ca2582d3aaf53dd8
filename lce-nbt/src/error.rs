//! Error types for NBT parsing

use thiserror::Error;

/// Result type for NBT operations
pub type Result<T> = std::result::Result<T, NbtError>;

/// NBT error types
#[derive(Error, Debug)]
pub enum NbtError {
    /// Cursor error
    #[error("cursor error: {0}")]
    Io(#[from] lce_io::IoError),

    /// Tag id outside the known set
    #[error("unknown tag kind: {0:#04x}")]
    UnknownTagKind(u8),

    /// Root tag is not a compound
    #[error("root tag is not a compound (marker {0:#04x})")]
    RootNotCompound(u8),

    /// Nesting beyond the depth limit
    #[error("tag tree nested deeper than {0} levels")]
    DepthLimit(usize),
}
