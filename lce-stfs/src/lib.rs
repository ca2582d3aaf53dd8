//! Read-only walker for the STFS package format that wraps Xbox 360 save
//! `.bin` files.
//!
//! STFS addresses content through a tree of hash tables interleaved with the
//! 4 096-byte data blocks. A package is "male" or "female" (one bit of the
//! volume descriptor), which selects the spacing constants of that tree.
//! Logical block numbers are mapped to backing block numbers by skipping the
//! hash tables, and a file's blocks are chained through the `next_block`
//! field of its level-0 hash entries.
//!
//! This crate only ever reads: it locates and extracts the inner
//! `savegame.dat` archive (plus the display name and thumbnail bytes) and
//! leaves the package signature alone.

mod error;
mod header;
mod package;

pub use error::{Result, StfsError};
pub use header::{PackageHeader, VolumeDescriptor};
pub use package::{find_savegame, FileListing, StfsFileEntry, StfsPackage};

/// Name of the inner archive carried by every LCE savegame package.
pub const SAVEGAME_NAME: &str = "savegame.dat";
