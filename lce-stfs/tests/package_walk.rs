//! Synthetic-package tests for the STFS walker.

use lce_io::{Endian, Writer};
use lce_stfs::{find_savegame, StfsError, StfsPackage};

const HEADER_SIZE: u32 = 0x2000;
const FIRST_HASH_TABLE: usize = 0x2000;
const FILE_TABLE: usize = 0x3000; // backing address of logical block 0
const BLOCK_1: usize = 0x4000;
const BLOCK_2: usize = 0x5000;

/// Lay down a minimal female package: one level-0 hash table, logical block
/// 0 holding the file table, logical blocks 1 and 2 holding data.
fn build_package() -> Vec<u8> {
    let mut w = Writer::new();

    w.seek(0x340);
    w.write_u32(HEADER_SIZE);
    w.write_u32(1); // content type: savegame
    // file-system word at 0x3A9 stays zero: STFS

    // volume descriptor
    w.seek(0x379);
    w.write_u8(0x24);
    w.write_u8(0); // reserved
    w.write_u8(0x01); // block separation -> package sex female
    w.set_endian(Endian::Little);
    w.write_u16(1); // file table block count
    w.write_u24(0); // file table block number
    w.set_endian(Endian::Big);
    w.seek(0x379 + 8 + 0x14); // past the top table hash
    w.write_u32(0xAA); // allocated blocks
    w.write_u32(0);

    // display name, null-terminated UTF-16BE
    w.seek(0x411);
    w.write_wide_string("World", 6);

    // no thumbnails: both size words at 0x1712 stay zero

    // level-0 hash table: give blocks 1 and 2 a chain 1 -> 2 -> sentinel
    w.seek(FIRST_HASH_TABLE + 0x18 + 0x14);
    w.write_u8(0);
    w.write_u24(2);
    w.seek(FIRST_HASH_TABLE + 2 * 0x18 + 0x14);
    w.write_u8(0);
    w.write_u24(0xFF_FFFF);

    // file table, entry stride 0x40
    write_entry(&mut w, FILE_TABLE, "savegame.dat", 0x4C, 2, 1, 0x2000);
    write_entry(&mut w, FILE_TABLE + 0x40, "players.dat", 11, 2, 1, 0x1800);
    write_entry(&mut w, FILE_TABLE + 0x80, "bad.dat", 7, 1, 0xBB, 0x1000);

    // data blocks
    w.seek(BLOCK_1);
    w.write_bytes(&[0xA1; 0x1000]);
    w.seek(BLOCK_2);
    w.write_bytes(&[0xB2; 0x1000]);

    w.into_vec()
}

fn write_entry(
    w: &mut Writer,
    at: usize,
    name: &str,
    name_len_byte: u8,
    blocks: u32,
    start: u32,
    size: u32,
) {
    w.seek(at);
    let mut padded = [0u8; 0x28];
    padded[..name.len()].copy_from_slice(name.as_bytes());
    w.write_bytes(&padded);
    w.write_u8(name_len_byte);
    w.set_endian(Endian::Little);
    w.write_u24(blocks);
    w.write_u24(0); // duplicate block count
    w.write_u24(start);
    w.set_endian(Endian::Big);
    w.write_u16(0xFFFF); // path indicator: root
    w.write_u32(size);
    w.write_u32(0x4A21_0000); // created (FAT timestamp)
    w.write_u32(0);
}

#[test]
fn test_contiguous_extraction_concatenates_blocks() {
    let bytes = build_package();
    let package = StfsPackage::parse(&bytes).unwrap();

    assert_eq!(package.header().display_name, "World");
    assert_eq!(package.header().volume.alloc_block_count, 0xAA);

    let savegame = package.extract_savegame().unwrap();
    assert_eq!(savegame.len(), 0x2000);
    assert!(savegame[..0x1000].iter().all(|&b| b == 0xA1));
    assert!(savegame[0x1000..].iter().all(|&b| b == 0xB2));
}

#[test]
fn test_chained_extraction_follows_next_block() {
    let bytes = build_package();
    let package = StfsPackage::parse(&bytes).unwrap();

    let entry = package
        .file_listing()
        .files
        .iter()
        .find(|f| f.name == "players.dat")
        .unwrap();
    assert_eq!(entry.flags, 0); // fragmented
    let data = package.extract_file(entry).unwrap();
    assert_eq!(data.len(), 0x1800);
    assert!(data[..0x1000].iter().all(|&b| b == 0xA1));
    assert!(data[0x1000..].iter().all(|&b| b == 0xB2));
}

#[test]
fn test_illegal_block_number_is_fatal() {
    let bytes = build_package();
    let package = StfsPackage::parse(&bytes).unwrap();

    let entry = package
        .file_listing()
        .files
        .iter()
        .find(|f| f.name == "bad.dat")
        .unwrap();
    assert!(matches!(
        package.extract_file(entry).unwrap_err(),
        StfsError::IllegalBlock { block: 0xBB, .. }
    ));
}

#[test]
fn test_file_table_entries_parse() {
    let bytes = build_package();
    let package = StfsPackage::parse(&bytes).unwrap();
    let listing = package.file_listing();

    assert_eq!(listing.files.len(), 3);
    let savegame = find_savegame(listing).unwrap();
    assert_eq!(savegame.blocks_for_file, 2);
    assert_eq!(savegame.starting_block_num, 1);
    assert_eq!(savegame.file_size, 0x2000);
    assert_eq!(savegame.flags, 1); // contiguous
    assert_eq!(savegame.created_timestamp, 0x4A21_0000);
}

#[test]
fn test_not_a_savegame_content_type() {
    let mut bytes = build_package();
    bytes[0x344..0x348].copy_from_slice(&2u32.to_be_bytes());
    assert!(matches!(
        StfsPackage::parse(&bytes).unwrap_err(),
        StfsError::NotASavegame(_)
    ));
}

#[test]
fn test_non_stfs_framing_rejected() {
    let mut bytes = build_package();
    bytes[0x3A9..0x3AD].copy_from_slice(&1u32.to_be_bytes());
    assert!(matches!(
        StfsPackage::parse(&bytes).unwrap_err(),
        StfsError::NotASavegame(_)
    ));
}
