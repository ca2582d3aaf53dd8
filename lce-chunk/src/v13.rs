//! The v13 chunk codec.
//!
//! Differs from v12 in four places: the header opens with an extra
//! `u16 max_grid_amount` (echoed on write, never recomputed), the block data
//! starts at 28 instead of 26 (grid payloads at `0xCE + …`), the two
//! sub-blocks of a light kind share a leading descriptor pair, and the tail
//! is one NBT compound instead of three extracted lists.

use lce_io::{Reader, Writer};
use tracing::trace;

use crate::{blockdata, light, ChunkData, Result};

/// Absolute offset of the block-data header.
const DATA_START: usize = 28;

/// Decode a v13 chunk. The cursor must sit just past the record's version
/// word; the record's absolute offsets include it.
pub fn decode(r: &mut Reader<'_>) -> Result<ChunkData> {
    let mut chunk = ChunkData::new();

    chunk.max_grid_amount = r.read_u16()?;
    chunk.chunk_x = r.read_u32()? as i32;
    chunk.chunk_z = r.read_u32()? as i32;
    chunk.last_update = r.read_u64()? as i64;
    chunk.inhabited_time = r.read_u64()? as i64;
    trace!("decoding v13 chunk ({}, {})", chunk.chunk_x, chunk.chunk_z);

    blockdata::decode_block_data(r, DATA_START, &mut chunk)?;

    light::decode_light_v13(r, &mut chunk.sky_light)?;
    light::decode_light_v13(r, &mut chunk.block_light)?;

    r.read_exact(&mut chunk.height_map)?;
    chunk.terrain_populated = r.read_u16()? as i16;
    r.read_exact(&mut chunk.biomes)?;

    if r.remaining() != 0 && r.peek_u8()? == 0x0A {
        chunk.nbt = Some(lce_nbt::read_tag(r)?);
    }

    chunk.last_version = crate::VERSION_V13;
    chunk.valid = true;
    Ok(chunk)
}

/// Encode a v13 chunk. The cursor must sit just past the version word
/// written by the region layer.
pub fn encode(chunk: &ChunkData, w: &mut Writer) -> Result<()> {
    w.write_u16(chunk.max_grid_amount);
    w.write_u32(chunk.chunk_x as u32);
    w.write_u32(chunk.chunk_z as u32);
    w.write_u64(chunk.last_update as u64);
    w.write_u64(chunk.inhabited_time as u64);

    blockdata::encode_block_data(w, DATA_START, chunk)?;

    light::encode_light_v13(w, &chunk.sky_light);
    light::encode_light_v13(w, &chunk.block_light);

    w.write_bytes(&chunk.height_map);
    w.write_u16(chunk.terrain_populated as u16);
    w.write_bytes(&chunk.biomes);

    if let Some(nbt) = &chunk.nbt {
        lce_nbt::write_tag(nbt, w)?;
    }
    Ok(())
}
