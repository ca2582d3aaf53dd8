//! Opaque NBT tag trees.
//!
//! The save formats embed NBT documents at the tail of chunk records and in
//! several standalone inner files. The rest of the engine treats those
//! documents as opaque [`Tag`] trees: it reads them, extracts or re-attaches
//! a handful of well-known children, and writes them back byte-compatibly.
//!
//! Integers on the wire follow the endianness of the cursor they are read
//! through, which is how the one format serves both byte orders.

mod codec;
mod error;
mod tag;

pub use codec::{read_tag, write_tag};
pub use error::{NbtError, Result};
pub use tag::{Tag, TagKind};
