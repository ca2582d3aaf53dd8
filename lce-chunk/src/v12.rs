//! The v12 chunk codec.
//!
//! Record layout (offsets are absolute within the record, whose first two
//! bytes are the version word consumed by the region layer):
//!
//! ```text
//! +2   u32 chunk_x, u32 chunk_z, u64 last_update, u64 inhabited_time
//! +26  block data (see `blockdata`)
//! then four light sub-blocks (sky ×2, block ×2), 256 height-map bytes,
//! u16 terrain_populated, 256 biome bytes, optional trailing NBT compound
//! holding the Entities / TileEntities / TileTicks lists.
//! ```

use lce_io::{Reader, Writer};
use lce_nbt::{Tag, TagKind};
use tracing::trace;

use crate::{blockdata, light, ChunkData, Result};

/// Absolute offset of the block-data header.
const DATA_START: usize = 26;

fn empty_list() -> Tag {
    Tag::make_list(TagKind::Compound, Vec::new())
}

/// Decode a v12 chunk. The cursor must sit just past the record's version
/// word; the record's absolute offsets include it.
pub fn decode(r: &mut Reader<'_>) -> Result<ChunkData> {
    let mut chunk = ChunkData::new();

    chunk.chunk_x = r.read_u32()? as i32;
    chunk.chunk_z = r.read_u32()? as i32;
    chunk.last_update = r.read_u64()? as i64;
    chunk.inhabited_time = r.read_u64()? as i64;
    trace!("decoding v12 chunk ({}, {})", chunk.chunk_x, chunk.chunk_z);

    blockdata::decode_block_data(r, DATA_START, &mut chunk)?;

    light::decode_light_v12(r, &mut chunk.sky_light)?;
    light::decode_light_v12(r, &mut chunk.block_light)?;

    r.read_exact(&mut chunk.height_map)?;
    chunk.terrain_populated = r.read_u16()? as i16;
    r.read_exact(&mut chunk.biomes)?;

    if r.remaining() != 0 && r.peek_u8()? == 0x0A {
        let mut root = lce_nbt::read_tag(r)?;
        chunk.entities = root.extract("Entities").unwrap_or_else(empty_list);
        chunk.tile_entities = root.extract("TileEntities").unwrap_or_else(empty_list);
        chunk.tile_ticks = root.extract("TileTicks").unwrap_or_else(empty_list);
    }

    chunk.last_version = crate::VERSION_V12;
    chunk.valid = true;
    Ok(chunk)
}

/// Encode a v12 chunk. The cursor must sit just past the version word
/// written by the region layer.
pub fn encode(chunk: &ChunkData, w: &mut Writer) -> Result<()> {
    w.write_u32(chunk.chunk_x as u32);
    w.write_u32(chunk.chunk_z as u32);
    w.write_u64(chunk.last_update as u64);
    w.write_u64(chunk.inhabited_time as u64);

    blockdata::encode_block_data(w, DATA_START, chunk)?;

    light::encode_light_v12(w, &chunk.sky_light);
    light::encode_light_v12(w, &chunk.block_light);

    w.write_bytes(&chunk.height_map);
    w.write_u16(chunk.terrain_populated as u16);
    w.write_bytes(&chunk.biomes);

    let mut root = Tag::make_compound(Vec::new());
    root.insert("Entities", chunk.entities.clone());
    root.insert("TileEntities", chunk.tile_entities.clone());
    root.insert("TileTicks", chunk.tile_ticks.clone());
    lce_nbt::write_tag(&root, w)?;
    Ok(())
}
