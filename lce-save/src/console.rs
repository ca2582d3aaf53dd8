//! Console table.

use std::str::FromStr;

use lce_io::Endian;

use crate::SaveError;

/// The consoles whose saves this engine reads and writes.
///
/// Endianness here applies to the archive listing and region envelope; chunk
/// interiors keep their own fixed discipline regardless of console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Console {
    Xbox360,
    Ps3,
    Rpcs3,
    Vita,
    Ps4,
    WiiU,
    Switch,
}

impl Console {
    /// Byte order of this console's archive listing and region files.
    pub fn endian(self) -> Endian {
        match self {
            Console::Xbox360 | Console::Ps3 | Console::Rpcs3 | Console::WiiU => Endian::Big,
            Console::Vita | Console::Ps4 | Console::Switch => Endian::Little,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Console::Xbox360 => "xbox360",
            Console::Ps3 => "ps3",
            Console::Rpcs3 => "rpcs3",
            Console::Vita => "vita",
            Console::Ps4 => "ps4",
            Console::WiiU => "wiiu",
            Console::Switch => "switch",
        }
    }
}

impl FromStr for Console {
    type Err = SaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "xbox360" | "x360" => Console::Xbox360,
            "ps3" => Console::Ps3,
            "rpcs3" => Console::Rpcs3,
            "vita" | "psvita" => Console::Vita,
            "ps4" => Console::Ps4,
            "wiiu" => Console::WiiU,
            "switch" => Console::Switch,
            other => return Err(SaveError::UnknownConsole(other.to_string())),
        })
    }
}
