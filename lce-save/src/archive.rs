//! The archive facade and conversion driver.

use std::fs;
use std::path::Path;

use lce_region::Region;
use lce_stfs::StfsPackage;
use tracing::{debug, info};

use crate::{listing, Console, FileKind, InnerFile, Result};

/// Leading magics of STFS-wrapped `.bin` packages.
const STFS_MAGICS: [&[u8; 4]; 3] = [b"CON ", b"LIVE", b"PIRS"];

/// A save archive held fully in memory.
#[derive(Debug)]
pub struct SaveArchive {
    /// Console whose byte order the current payloads use.
    pub console: Console,
    pub oldest_version: u16,
    pub current_version: u16,
    pub files: Vec<InnerFile>,
}

impl SaveArchive {
    /// Parse a save for `console`. Xbox 360 input wrapped in an STFS
    /// package is unwrapped to its inner `savegame.dat` first.
    pub fn read(bytes: &[u8], console: Console) -> Result<SaveArchive> {
        if console == Console::Xbox360 && is_stfs(bytes) {
            debug!("unwrapping STFS package");
            let package = StfsPackage::parse(bytes)?;
            let inner = package.extract_savegame()?;
            return listing::read(&inner, console);
        }
        listing::read(bytes, console)
    }

    /// Serialize the archive in `console`'s byte order.
    pub fn write(&self, console: Console) -> Result<Vec<u8>> {
        listing::write(self, console)
    }

    /// Re-encode every region file for `target` and adopt its byte order.
    /// Converting to a different console drops the player and map-mapping
    /// files, which do not transfer across machines.
    pub fn convert(&mut self, target: Console) -> Result<()> {
        if target != self.console {
            self.remove_kinds(&[FileKind::Player, FileKind::DataMapping]);
        }

        let source_endian = self.console.endian();
        let target_endian = target.endian();
        for file in self.files.iter_mut().filter(|f| f.kind.is_region()) {
            let mut region = Region::read(&file.payload, source_endian)?;
            file.payload = region.convert(target_endian)?;
        }

        info!(
            "converted archive: {} -> {}, {} files",
            self.console.name(),
            target.name(),
            self.files.len()
        );
        self.console = target;
        Ok(())
    }

    /// Look up the first file of `kind`.
    pub fn file(&self, kind: FileKind) -> Option<&InnerFile> {
        self.files.iter().find(|f| f.kind == kind)
    }

    /// Remove and return every file of `kind`.
    pub fn collect(&mut self, kind: FileKind) -> Vec<InnerFile> {
        let mut collected = Vec::new();
        let mut i = 0;
        while i < self.files.len() {
            if self.files[i].kind == kind {
                collected.push(self.files.remove(i));
            } else {
                i += 1;
            }
        }
        collected
    }

    pub fn add_files(&mut self, files: Vec<InnerFile>) {
        self.files.extend(files);
    }

    /// Drop every file whose kind appears in `kinds`.
    pub fn remove_kinds(&mut self, kinds: &[FileKind]) {
        self.files.retain(|f| !kinds.contains(&f.kind));
    }

    /// Keep only region files whose coordinates are 0 or -1 on both axes
    /// (the four regions around the origin that LCE worlds actually use).
    pub fn prune_regions(&mut self) {
        self.files.retain(|f| {
            let Some((x, z)) = f.region_coords() else {
                return true;
            };
            (x == 0 || x == -1) && (z == 0 || z == -1)
        });
    }

    /// Replace this archive's region files with `donor`'s.
    pub fn replace_regions_from(&mut self, donor: &mut SaveArchive) {
        self.remove_kinds(&[
            FileKind::RegionNether,
            FileKind::RegionOverworld,
            FileKind::RegionEnd,
        ]);
        for kind in [
            FileKind::RegionNether,
            FileKind::RegionOverworld,
            FileKind::RegionEnd,
        ] {
            let regions = donor.collect(kind);
            self.add_files(regions);
        }
    }

    /// Write every inner file under `dir` using its canonical name.
    pub fn dump_to_dir(&self, dir: &Path) -> Result<()> {
        for file in &self.files {
            let path = dir.join(file.construct_name());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &file.payload)?;
        }
        Ok(())
    }
}

fn is_stfs(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && STFS_MAGICS.iter().any(|magic| &bytes[..4] == *magic)
}
