//! Hash-tree navigation, file table parsing, and block extraction.

use lce_io::{Endian, Reader};
use tracing::{debug, trace};

use crate::{PackageHeader, Result, StfsError, SAVEGAME_NAME};

const BLOCK_SIZE: usize = 0x1000;
/// Data blocks covered by one level-0 hash table.
const BLOCKS_PER_TABLE: u32 = 0xAA;
/// Data blocks covered by one level-1 hash table.
const BLOCKS_PER_L1: u32 = 0x70E4;
/// Data blocks addressable by a level-2 tree.
const BLOCKS_PER_L2: u32 = 0x4A_F768;
/// Bytes per hash entry.
const HASH_ENTRY_SIZE: u32 = 0x18;

/// One level-0 hash entry, reduced to the fields the walker needs.
#[derive(Debug, Clone, Copy)]
struct HashEntry {
    status: u8,
    next_block: u32,
}

/// One file-table entry.
#[derive(Debug, Clone)]
pub struct StfsFileEntry {
    pub name: String,
    pub flags: u8,
    pub blocks_for_file: u32,
    pub starting_block_num: u32,
    pub path_indicator: u16,
    pub file_size: u32,
    pub created_timestamp: u32,
    pub accessed_timestamp: u32,
    pub entry_index: u32,
}

impl StfsFileEntry {
    fn is_directory(&self) -> bool {
        self.flags & 2 != 0
    }

    fn is_contiguous(&self) -> bool {
        self.flags & 1 != 0
    }
}

/// The file table as a folder tree.
#[derive(Debug, Clone, Default)]
pub struct FileListing {
    pub folder: Option<StfsFileEntry>,
    pub files: Vec<StfsFileEntry>,
    pub folders: Vec<FileListing>,
}

impl FileListing {
    fn folder_index(&self) -> u32 {
        self.folder.as_ref().map_or(0xFFFF, |f| f.entry_index)
    }
}

/// Locate the inner savegame entry anywhere in the folder tree.
pub fn find_savegame(listing: &FileListing) -> Option<&StfsFileEntry> {
    if let Some(entry) = listing.files.iter().find(|f| f.name == SAVEGAME_NAME) {
        return Some(entry);
    }
    listing.folders.iter().find_map(find_savegame)
}

/// A parsed, read-only STFS package over a borrowed buffer.
#[derive(Debug)]
pub struct StfsPackage<'a> {
    data: &'a [u8],
    header: PackageHeader,
    /// One bit of the volume descriptor; selects the hash-tree geometry.
    package_sex: u8,
    block_step: [u32; 2],
    first_hash_table_address: u32,
    top_level: u8,
    top_table: Vec<HashEntry>,
    listing: FileListing,
}

impl<'a> StfsPackage<'a> {
    /// Parse the package header, the top hash table, and the file table.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = PackageHeader::parse(&mut Reader::new(data))?;

        let package_sex = (!header.volume.block_separation) & 1;
        let block_step = if package_sex == 0 {
            [0xAB, 0x718F] // female
        } else {
            [0xAC, 0x723A] // male
        };
        let first_hash_table_address = (header.header_size + 0x0FFF) & 0xFFFF_F000;

        let alloc = header.volume.alloc_block_count;
        let top_level: u8 = if alloc <= BLOCKS_PER_TABLE {
            0
        } else if alloc <= BLOCKS_PER_L1 {
            1
        } else if alloc <= BLOCKS_PER_L2 {
            2
        } else {
            return Err(StfsError::InvalidBlockCount(alloc));
        };
        debug!(
            "package sex {package_sex}, top level {top_level}, first hash table at {first_hash_table_address:#x}"
        );

        let mut package = StfsPackage {
            data,
            header,
            package_sex,
            block_step,
            first_hash_table_address,
            top_level,
            top_table: Vec::new(),
            listing: FileListing::default(),
        };
        package.read_top_table()?;
        package.read_file_listing()?;
        Ok(package)
    }

    pub fn header(&self) -> &PackageHeader {
        &self.header
    }

    pub fn file_listing(&self) -> &FileListing {
        &self.listing
    }

    /// Extract the inner `savegame.dat` archive.
    pub fn extract_savegame(&self) -> Result<Vec<u8>> {
        let entry = find_savegame(&self.listing).ok_or(StfsError::MissingSavegame)?;
        self.extract_file(entry)
    }

    fn reader_at(&self, pos: usize) -> Result<Reader<'a>> {
        let mut r = Reader::new(self.data);
        r.seek(pos)?;
        Ok(r)
    }

    fn alloc_block_count(&self) -> u32 {
        self.header.volume.alloc_block_count
    }

    /// Map a logical block number onto its backing block number, stepping
    /// over every hash table that precedes it.
    fn backing_data_block(&self, block: u32) -> u32 {
        let sex = self.package_sex;
        let mut n = (((block + BLOCKS_PER_TABLE) / BLOCKS_PER_TABLE) << sex) + block;
        if block < BLOCKS_PER_TABLE {
            return n;
        }
        n += ((block + BLOCKS_PER_L1) / BLOCKS_PER_L1) << sex;
        if block < BLOCKS_PER_L1 {
            n
        } else {
            (1 << sex) + n
        }
    }

    /// Backing block number of the level-0 hash table covering `block`.
    fn level0_hash_block(&self, block: u32) -> u32 {
        if block < BLOCKS_PER_TABLE {
            return 0;
        }
        let mut num = (block / BLOCKS_PER_TABLE) * self.block_step[0];
        num += ((block / BLOCKS_PER_L1) + 1) << self.package_sex;
        if block / BLOCKS_PER_L1 == 0 {
            num
        } else {
            num + (1 << self.package_sex)
        }
    }

    /// Backing block number of the level-1 hash table covering `block`.
    fn level1_hash_block(&self, block: u32) -> u32 {
        if block < BLOCKS_PER_L1 {
            self.block_step[0]
        } else {
            (1 << self.package_sex) + (block / BLOCKS_PER_L1) * self.block_step[1]
        }
    }

    /// Backing block number of the level-2 hash table.
    fn level2_hash_block(&self) -> u32 {
        self.block_step[1]
    }

    fn level_hash_block(&self, block: u32, level: u8) -> u32 {
        match level {
            0 => self.level0_hash_block(block),
            1 => self.level1_hash_block(block),
            _ => self.level2_hash_block(),
        }
    }

    /// Absolute file address of a logical block.
    fn block_to_address(&self, block: u32) -> Result<u32> {
        if block >= 0xFF_FFFF {
            return Err(StfsError::IllegalBlock {
                block,
                alloc: self.alloc_block_count(),
            });
        }
        Ok((self.backing_data_block(block) << 0xC) + self.first_hash_table_address)
    }

    /// Absolute file address of `block`'s level-0 hash entry, adjusted for
    /// whichever table half the active-table bits select.
    fn hash_address(&self, block: u32) -> Result<u32> {
        if block >= self.alloc_block_count() {
            return Err(StfsError::IllegalBlock {
                block,
                alloc: self.alloc_block_count(),
            });
        }

        let mut addr = (self.level0_hash_block(block) << 0xC)
            + self.first_hash_table_address
            + (block % BLOCKS_PER_TABLE) * HASH_ENTRY_SIZE;

        match self.top_level {
            0 => {
                addr += ((self.header.volume.block_separation as u32) & 2) << 0xB;
            }
            1 => {
                let entry = self.top_entry(block / BLOCKS_PER_TABLE)?;
                addr += ((entry.status as u32) & 0x40) << 6;
            }
            _ => {
                let entry = self.top_entry(block / BLOCKS_PER_L1)?;
                let level1_offset = ((entry.status as u32) & 0x40) << 6;
                let pos = (self.level1_hash_block(block) << 0xC)
                    + self.first_hash_table_address
                    + level1_offset
                    + (block % BLOCKS_PER_TABLE) * HASH_ENTRY_SIZE;
                let mut r = self.reader_at(pos as usize + 0x14)?;
                addr += ((r.read_u8()? as u32) & 0x40) << 6;
            }
        }
        Ok(addr)
    }

    fn top_entry(&self, index: u32) -> Result<HashEntry> {
        self.top_table
            .get(index as usize)
            .copied()
            .ok_or(StfsError::IllegalBlock {
                block: index,
                alloc: self.alloc_block_count(),
            })
    }

    fn block_hash_entry(&self, block: u32) -> Result<HashEntry> {
        let mut r = self.reader_at(self.hash_address(block)? as usize)?;
        r.skip(0x14)?; // block hash
        let status = r.read_u8()?;
        let next_block = r.read_u24()?;
        Ok(HashEntry { status, next_block })
    }

    /// Bytes to skip when the cursor lands on a hash table during a
    /// contiguous walk.
    fn hash_table_skip(&self, table_address: u32) -> u32 {
        let mut true_block = (table_address - self.first_hash_table_address) >> 0xC;
        if true_block == 0 {
            return 0x1000 << self.package_sex;
        }
        if true_block == self.block_step[1] {
            return 0x3000 << self.package_sex;
        }
        if true_block > self.block_step[1] {
            true_block -= self.block_step[1] + (1 << self.package_sex);
        }
        if true_block == self.block_step[0] || true_block % self.block_step[1] == 0 {
            0x2000 << self.package_sex
        } else {
            0x1000 << self.package_sex
        }
    }

    fn read_top_table(&mut self) -> Result<()> {
        let alloc = self.alloc_block_count();
        let true_block = self.level_hash_block(0, self.top_level);
        let base = (true_block << 0xC) + self.first_hash_table_address;
        let address = base + (((self.header.volume.block_separation as u32) & 2) << 0xB);

        let per_level = [1u32, BLOCKS_PER_TABLE, BLOCKS_PER_L1];
        let mut entry_count = alloc / per_level[self.top_level as usize];
        if alloc > BLOCKS_PER_L1 && alloc % BLOCKS_PER_L1 != 0 {
            entry_count += 1;
        } else if alloc > BLOCKS_PER_TABLE && alloc % BLOCKS_PER_TABLE != 0 {
            entry_count += 1;
        }

        let mut r = self.reader_at(address as usize)?;
        self.top_table = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            r.skip(0x14)?;
            let status = r.read_u8()?;
            let next_block = r.read_u24()?;
            self.top_table.push(HashEntry { status, next_block });
        }
        trace!("top table: {} entries at {address:#x}", entry_count);
        Ok(())
    }

    fn read_file_listing(&mut self) -> Result<()> {
        let mut entries = Vec::new();
        let mut block = self.header.volume.file_table_block_num;

        for table_block in 0..self.header.volume.file_table_block_count as u32 {
            let table_address = self.block_to_address(block)? as usize;
            let mut r = self.reader_at(table_address)?;

            for i in 0..0x40u32 {
                let name = r.read_string(0x28)?;
                let name_len = r.read_u8()?;
                if name_len & 0x3F == 0 {
                    r.seek(table_address + ((i as usize + 1) * 0x40))?;
                    continue;
                }
                if name.is_empty() {
                    break;
                }

                r.set_endian(Endian::Little);
                let blocks_for_file = r.read_u24()?;
                r.skip(3)?; // duplicate of the allocated-block count
                let starting_block_num = r.read_u24()?;
                r.set_endian(Endian::Big);
                let path_indicator = r.read_u16()?;
                let file_size = r.read_u32()?;
                let created_timestamp = r.read_u32()?;
                let accessed_timestamp = r.read_u32()?;

                entries.push(StfsFileEntry {
                    name,
                    flags: name_len >> 6,
                    blocks_for_file,
                    starting_block_num,
                    path_indicator,
                    file_size,
                    created_timestamp,
                    accessed_timestamp,
                    entry_index: table_block * 0x40 + i,
                });
            }

            block = self.block_hash_entry(block)?.next_block;
        }

        debug!("file table: {} entries", entries.len());
        let mut root = FileListing::default();
        attach_entries(&entries, &mut root);
        self.listing = root;
        Ok(())
    }

    /// Copy one block (or a prefix of it) out of the package.
    fn extract_block(&self, block: u32, out: &mut [u8]) -> Result<()> {
        debug_assert!(out.len() <= BLOCK_SIZE);
        if block >= self.alloc_block_count() {
            return Err(StfsError::IllegalBlock {
                block,
                alloc: self.alloc_block_count(),
            });
        }
        let mut r = self.reader_at(self.block_to_address(block)? as usize)?;
        r.read_exact(out)?;
        Ok(())
    }

    /// Extract a file's bytes. Contiguous files are walked page-wise with
    /// hash tables skipped in place; fragmented files chase the `next_block`
    /// chain, which the allocated-block bound keeps finite.
    pub fn extract_file(&self, entry: &StfsFileEntry) -> Result<Vec<u8>> {
        let file_size = entry.file_size as usize;
        if file_size == 0 {
            return Ok(Vec::new());
        }
        trace!(
            "extracting '{}': {} bytes, contiguous: {}",
            entry.name,
            file_size,
            entry.is_contiguous()
        );
        let mut out = Vec::with_capacity(file_size);

        if entry.is_contiguous() {
            let start = self.block_to_address(entry.starting_block_num)? as usize;
            let mut r = self.reader_at(start)?;

            // pages until the next hash table interrupts the run
            let block_count = (self.level0_hash_block(entry.starting_block_num)
                + self.block_step[0])
                - ((start as u32 - self.first_hash_table_address) >> 0xC);

            if entry.blocks_for_file <= block_count {
                out.extend_from_slice(r.read_bytes(file_size)?);
                return Ok(out);
            }
            let amount = (block_count as usize) << 0xC;
            out.extend_from_slice(r.read_bytes(amount)?);

            let mut remaining = file_size - amount;
            while remaining >= BLOCKS_PER_TABLE as usize * BLOCK_SIZE {
                let pos = r.pos();
                r.seek(pos + self.hash_table_skip(pos as u32) as usize)?;
                out.extend_from_slice(r.read_bytes(BLOCKS_PER_TABLE as usize * BLOCK_SIZE)?);
                remaining -= BLOCKS_PER_TABLE as usize * BLOCK_SIZE;
            }
            if remaining != 0 {
                let pos = r.pos();
                r.seek(pos + self.hash_table_skip(pos as u32) as usize)?;
                out.extend_from_slice(r.read_bytes(remaining)?);
            }
        } else {
            let full_blocks = file_size / BLOCK_SIZE;
            let tail = file_size % BLOCK_SIZE;
            let mut block = entry.starting_block_num;
            let mut buffer = [0u8; BLOCK_SIZE];

            for _ in 0..full_blocks {
                self.extract_block(block, &mut buffer)?;
                out.extend_from_slice(&buffer);
                block = self.block_hash_entry(block)?.next_block;
            }
            if tail != 0 {
                self.extract_block(block, &mut buffer[..tail])?;
                out.extend_from_slice(&buffer[..tail]);
            }
        }
        Ok(out)
    }
}


/// Fold the flat entry list into the folder tree, root first.
fn attach_entries(entries: &[StfsFileEntry], node: &mut FileListing) {
    let folder_index = node.folder_index();
    for entry in entries {
        if entry.path_indicator as u32 != folder_index {
            continue;
        }
        if !entry.is_directory() {
            node.files.push(entry.clone());
        } else if entry.entry_index != folder_index {
            node.folders.push(FileListing {
                folder: Some(entry.clone()),
                files: Vec::new(),
                folders: Vec::new(),
            });
        }
    }
    for folder in &mut node.folders {
        attach_entries(entries, folder);
    }
}
