//! Chunk codecs for the two palette-based block-data formats ("v12" and
//! "v13") used by console-edition region files.
//!
//! A chunk is 16×256×16 cells. On disk it is cut into 16 Y-stacked sections
//! of 16×16×16 cells, and each section into 64 grids of 4×4×4 cells. Every
//! grid is encoded independently with the narrowest format that fits its
//! distinct block values: a single embedded value, a 1/2/3/4-bit palette, or
//! 64 raw cells, optionally doubled with a second "submerged" layer for
//! waterlogged cells.
//!
//! The two versions share all of the grid machinery and differ only in the
//! record header, section addressing, light-data framing, and the trailing
//! NBT shape. Chunk streams are big-endian with two little-endian islands:
//! the 16-bit grid-header words and the palette entries.

mod blockdata;
mod data;
mod error;
mod light;
pub mod v12;
pub mod v13;

pub use data::{ChunkData, CHUNK_CELLS, LIGHT_BYTES};
pub use error::{ChunkError, Result};

/// Version word at the front of a chunk record.
pub const VERSION_V12: u16 = 12;

/// Version word at the front of a chunk record.
pub const VERSION_V13: u16 = 13;
