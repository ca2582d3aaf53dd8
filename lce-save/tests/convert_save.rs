//! End-to-end: archive round trips, cross-console conversion, STFS unwrap.

use lce_chunk::{ChunkData, VERSION_V12, VERSION_V13};
use lce_io::{Endian, Writer};
use lce_region::Region;
use lce_save::{Console, FileKind, SaveArchive};

fn sample_chunk(x: i32, z: i32) -> ChunkData {
    let mut chunk = ChunkData::new();
    chunk.chunk_x = x;
    chunk.chunk_z = z;
    chunk.inhabited_time = 777;
    for bx in 0..16 {
        for bz in 0..16 {
            for y in 0..48 {
                chunk.set_block(bx, y, bz, ((bx * 7 + bz * 3 + y) % 11) as u16 + 1);
            }
        }
    }
    chunk.set_submerged(2, 40, 2, 0x0800);
    chunk.sky_light.fill(0xFF);
    chunk
}

fn region_payload(endian: Endian) -> Vec<u8> {
    let mut region = Region::new();
    region
        .encode_chunk(0, 0, &sample_chunk(0, 0), VERSION_V12)
        .unwrap();
    region
        .encode_chunk(3, 1, &sample_chunk(3, 1), VERSION_V13)
        .unwrap();
    region.write(endian).unwrap()
}

fn sample_archive(console: Console) -> SaveArchive {
    let mut archive = SaveArchive {
        console,
        oldest_version: 11,
        current_version: 3,
        files: Vec::new(),
    };
    archive.files.push(lce_save::InnerFile::new(
        "r.0.0.mcr".into(),
        100,
        region_payload(console.endian()),
    ));
    archive.files.push(lce_save::InnerFile::new(
        "level.dat".into(),
        200,
        vec![0x0A, 0x00, 0x00, 0x00],
    ));
    archive.files.push(lce_save::InnerFile::new(
        "players/Alex.dat".into(),
        300,
        vec![0x55; 64],
    ));
    archive
}

#[test]
fn test_archive_round_trip_preserves_chunks() {
    let archive = sample_archive(Console::WiiU);
    let bytes = archive.write(Console::WiiU).unwrap();
    let parsed = SaveArchive::read(&bytes, Console::WiiU).unwrap();

    assert_eq!(parsed.files.len(), 3);
    let region_file = parsed.file(FileKind::RegionOverworld).unwrap();
    let region = Region::read(&region_file.payload, Endian::Big).unwrap();
    let chunk = region.decode_chunk(0, 0).unwrap().unwrap();
    assert_eq!(chunk, {
        let mut expected = sample_chunk(0, 0);
        expected.last_version = VERSION_V12;
        expected.valid = true;
        expected
    });
}

#[test]
fn test_cross_console_conversion() {
    let mut archive = sample_archive(Console::WiiU);
    archive.convert(Console::Switch).unwrap();
    assert_eq!(archive.console, Console::Switch);
    // players do not transfer between consoles
    assert!(archive.file(FileKind::Player).is_none());

    let bytes = archive.write(Console::Switch).unwrap();
    let parsed = SaveArchive::read(&bytes, Console::Switch).unwrap();

    let region_file = parsed.file(FileKind::RegionOverworld).unwrap();
    let region = Region::read(&region_file.payload, Endian::Little).unwrap();

    let v12 = region.decode_chunk(0, 0).unwrap().unwrap();
    assert_eq!(v12.last_version, VERSION_V12);
    assert_eq!(v12.get_block(5, 10, 5), ((5 * 7 + 5 * 3 + 10) % 11) as u16 + 1);
    assert_eq!(v12.get_submerged(2, 40, 2), 0x0800);

    let v13 = region.decode_chunk(3, 1).unwrap().unwrap();
    assert_eq!(v13.last_version, VERSION_V13);
    assert_eq!(v13.chunk_x, 3);
}

#[test]
fn test_same_console_conversion_keeps_players() {
    let mut archive = sample_archive(Console::WiiU);
    archive.convert(Console::WiiU).unwrap();
    assert!(archive.file(FileKind::Player).is_some());
}

#[test]
fn test_stfs_wrapped_archive_unwraps() {
    let inner = {
        let mut archive = sample_archive(Console::Xbox360);
        archive.files.retain(|f| f.kind == FileKind::Level);
        archive.write(Console::Xbox360).unwrap()
    };
    assert!(inner.len() <= 0x1000, "listing must fit one block");

    let package = build_stfs_package(&inner);
    let parsed = SaveArchive::read(&package, Console::Xbox360).unwrap();
    assert_eq!(parsed.files.len(), 1);
    assert_eq!(parsed.files[0].name, "level.dat");
    assert_eq!(parsed.files[0].payload, vec![0x0A, 0x00, 0x00, 0x00]);
}

#[test]
fn test_dump_to_dir_writes_canonical_names() {
    let archive = sample_archive(Console::WiiU);
    let dir = tempfile::tempdir().unwrap();
    archive.dump_to_dir(dir.path()).unwrap();

    assert!(dir.path().join("r.0.0.mcr").is_file());
    assert!(dir.path().join("level.dat").is_file());
    let player = std::fs::read(dir.path().join("players/Alex.dat")).unwrap();
    assert_eq!(player, vec![0x55; 64]);
}

/// A minimal female STFS package whose logical block 0 is the file table
/// and block 1 carries `savegame.dat`.
fn build_stfs_package(savegame: &[u8]) -> Vec<u8> {
    assert!(savegame.len() <= 0x1000);
    let mut w = Writer::new();

    w.seek(0x340);
    w.write_u32(0x2000); // header size
    w.write_u32(1); // content type: savegame

    w.seek(0x379);
    w.write_u8(0x24);
    w.write_u8(0);
    w.write_u8(0x01); // block separation -> female
    w.set_endian(Endian::Little);
    w.write_u16(1); // file table blocks
    w.write_u24(0); // file table at logical block 0
    w.set_endian(Endian::Big);
    w.seek(0x379 + 8 + 0x14);
    w.write_u32(0xAA); // allocated blocks
    w.write_u32(0);

    w.seek(0x411);
    w.write_wide_string("Converted", 10);

    // file table entry at block 0 (backing address 0x3000)
    w.seek(0x3000);
    let mut name = [0u8; 0x28];
    name[..12].copy_from_slice(b"savegame.dat");
    w.write_bytes(&name);
    w.write_u8(12 | 0x40); // name length, contiguous flag
    w.set_endian(Endian::Little);
    w.write_u24(1); // blocks for file
    w.write_u24(0);
    w.write_u24(1); // starting block
    w.set_endian(Endian::Big);
    w.write_u16(0xFFFF);
    w.write_u32(savegame.len() as u32);
    w.write_u32(0);
    w.write_u32(0);

    // savegame at logical block 1 (backing address 0x4000)
    w.seek(0x4000);
    w.write_bytes(savegame);
    w.seek(0x5000);
    w.into_vec()
}
