//! Save archives of the console ("LCE") edition: reading, rewriting, and
//! cross-console conversion.
//!
//! An archive is a flat container: a 12-byte header, the concatenated inner
//! files, and a footer of fixed-width metadata entries, all in the owning
//! console's byte order. Xbox 360 saves additionally arrive wrapped in a
//! signed STFS package whose inner `savegame.dat` is the archive.
//!
//! ```no_run
//! use lce_save::{Console, SaveArchive};
//!
//! # fn demo(bytes: &[u8]) -> Result<(), lce_save::SaveError> {
//! let mut archive = SaveArchive::read(bytes, Console::Xbox360)?;
//! archive.convert(Console::WiiU)?;
//! let out = archive.write(Console::WiiU)?;
//! # let _ = out;
//! # Ok(())
//! # }
//! ```

mod archive;
mod console;
mod error;
mod file;
mod listing;

pub use archive::SaveArchive;
pub use console::Console;
pub use error::{Result, SaveError};
pub use file::{FileKind, InnerFile};
