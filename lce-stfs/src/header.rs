//! Package header and volume descriptor parsing.

use lce_io::{Endian, Reader};
use tracing::debug;

use crate::{Result, StfsError};

/// Offset of the header-size field.
const OFF_HEADER_SIZE: usize = 0x340;
/// Offset of the file-system selector; zero means STFS.
const OFF_FILE_SYSTEM: usize = 0x3A9;
/// Offset of the volume descriptor.
const OFF_VOLUME_DESCRIPTOR: usize = 0x379;
/// Offset of the display name (null-terminated UTF-16BE).
const OFF_DISPLAY_NAME: usize = 0x411;
/// Offset of the thumbnail size/data pair.
const OFF_THUMBNAIL: usize = 0x1712;
/// Offset of the title thumbnail data.
const OFF_TITLE_THUMBNAIL: usize = 0x571A;

/// STFS volume descriptor.
///
/// The two file-table fields sit little-endian inside the otherwise
/// big-endian descriptor.
#[derive(Debug, Clone)]
pub struct VolumeDescriptor {
    pub block_separation: u8,
    pub file_table_block_count: u16,
    pub file_table_block_num: u32,
    pub alloc_block_count: u32,
    pub unallocated_block_count: u32,
}

impl VolumeDescriptor {
    pub fn parse(r: &mut Reader<'_>) -> Result<Self> {
        let _size = r.read_u8()?;
        r.skip(1)?; // reserved
        let block_separation = r.read_u8()?;
        r.set_endian(Endian::Little);
        let file_table_block_count = r.read_u16()?;
        let file_table_block_num = r.read_u24()?;
        r.skip(0x14)?; // top hash table hash
        r.set_endian(Endian::Big);
        let alloc_block_count = r.read_u32()?;
        let unallocated_block_count = r.read_u32()?;
        Ok(VolumeDescriptor {
            block_separation,
            file_table_block_count,
            file_table_block_num,
            alloc_block_count,
            unallocated_block_count,
        })
    }
}

/// The package metadata this engine needs: sizes, the volume descriptor,
/// and the cosmetic fields surfaced to callers.
#[derive(Debug, Clone)]
pub struct PackageHeader {
    pub header_size: u32,
    pub display_name: String,
    /// Raw thumbnail bytes (a PNG, parsed elsewhere if at all).
    pub thumbnail: Vec<u8>,
    pub volume: VolumeDescriptor,
}

impl PackageHeader {
    pub fn parse(r: &mut Reader<'_>) -> Result<Self> {
        r.seek(OFF_HEADER_SIZE)?;
        let header_size = r.read_u32()?;

        // content type 1 is a savegame
        if r.read_u32()? != 1 {
            return Err(StfsError::NotASavegame("content type is not savegame"));
        }

        r.seek(OFF_FILE_SYSTEM)?;
        if r.read_u32()? != 0 {
            return Err(StfsError::NotASavegame("package is not STFS framed"));
        }

        r.seek(OFF_VOLUME_DESCRIPTOR)?;
        let volume = VolumeDescriptor::parse(r)?;
        debug!(
            "volume descriptor: separation={:#04x}, file table at {:#x} ({} blocks), {:#x} allocated",
            volume.block_separation,
            volume.file_table_block_num,
            volume.file_table_block_count,
            volume.alloc_block_count
        );

        r.seek(OFF_DISPLAY_NAME)?;
        let display_name = r.read_wide_cstring()?;

        r.seek(OFF_THUMBNAIL)?;
        let thumbnail_size = r.read_u32()?;
        let thumbnail = if thumbnail_size != 0 {
            r.skip(4)?; // title thumbnail size, unused here
            r.read_bytes(thumbnail_size as usize)?.to_vec()
        } else {
            let title_size = r.read_u32()?;
            if title_size != 0 {
                r.seek(OFF_TITLE_THUMBNAIL)?;
                r.read_bytes(title_size as usize)?.to_vec()
            } else {
                Vec::new()
            }
        };

        Ok(PackageHeader {
            header_size,
            display_name,
            thumbnail,
            volume,
        })
    }
}
