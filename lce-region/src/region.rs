//! Slot directory and chunk record envelope.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use lce_chunk::{v12, v13, ChunkData, ChunkError, VERSION_V12, VERSION_V13};
use lce_io::{Endian, Reader, Writer};
use tracing::{debug, warn};

use crate::{RegionError, Result};

/// Chunks along one side of a region.
pub const REGION_WIDTH: usize = 32;

const SLOT_COUNT: usize = REGION_WIDTH * REGION_WIDTH;
const SECTOR_SIZE: usize = 4096;
/// First sector past the two directory sectors.
const FIRST_DATA_SECTOR: usize = 2;

/// Compression flavour of one chunk record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Zlib,
    None,
}

/// One occupied region slot: the still-compressed record plus its
/// directory metadata.
#[derive(Debug, Clone)]
pub struct RegionChunk {
    pub payload: Vec<u8>,
    pub timestamp: u32,
    pub compression: Compression,
    /// Decompressed record size, kept for the envelope header.
    pub raw_len: u32,
}

impl RegionChunk {
    fn decompress(&self) -> Result<Vec<u8>> {
        match self.compression {
            Compression::Zlib => {
                let mut record = Vec::with_capacity(self.raw_len as usize);
                ZlibDecoder::new(self.payload.as_slice()).read_to_end(&mut record)?;
                Ok(record)
            }
            Compression::None => Ok(self.payload.clone()),
        }
    }
}

/// A region file held in memory: 32×32 optional chunk slots.
///
/// Chunks decode lazily per slot; re-encoding a slot replaces its record,
/// and [`Region::write`] lays the records back out contiguously.
#[derive(Debug)]
pub struct Region {
    slots: Vec<Option<RegionChunk>>,
}

impl Region {
    /// An empty region.
    pub fn new() -> Self {
        Region {
            slots: (0..SLOT_COUNT).map(|_| None).collect(),
        }
    }

    fn slot_index(x: usize, z: usize) -> Result<usize> {
        if x >= REGION_WIDTH || z >= REGION_WIDTH {
            return Err(RegionError::SlotOutOfBounds { x, z });
        }
        Ok(x + z * REGION_WIDTH)
    }

    /// Parse a region file. `endian` is the console's byte order, which
    /// governs the directory and envelope words only.
    pub fn read(bytes: &[u8], endian: Endian) -> Result<Region> {
        let mut r = Reader::with_endian(bytes, endian);

        let mut locations = [0u32; SLOT_COUNT];
        for location in locations.iter_mut() {
            *location = r.read_u32()?;
        }
        let mut timestamps = [0u32; SLOT_COUNT];
        for timestamp in timestamps.iter_mut() {
            *timestamp = r.read_u32()?;
        }

        let mut region = Region::new();
        let mut present = 0usize;
        for (i, &location) in locations.iter().enumerate() {
            if location == 0 {
                continue;
            }
            let sector_offset = (location >> 8) as usize;
            r.seek(sector_offset * SECTOR_SIZE)?;
            let tagged = r.read_u32()?;
            let compression = if tagged & 0x8000_0000 != 0 {
                Compression::Zlib
            } else {
                Compression::None
            };
            let len = (tagged & 0x0FFF_FFFF) as usize;
            let raw_len = r.read_u32()?;
            let payload = r.read_bytes(len)?.to_vec();
            region.slots[i] = Some(RegionChunk {
                payload,
                timestamp: timestamps[i],
                compression,
                raw_len,
            });
            present += 1;
        }
        debug!("region parsed: {present} of {SLOT_COUNT} slots present");
        Ok(region)
    }

    pub fn chunk(&self, x: usize, z: usize) -> Result<Option<&RegionChunk>> {
        Ok(self.slots[Self::slot_index(x, z)?].as_ref())
    }

    pub fn clear_slot(&mut self, x: usize, z: usize) -> Result<()> {
        self.slots[Self::slot_index(x, z)?] = None;
        Ok(())
    }

    /// Decompress and decode the chunk in slot `(x, z)`, if present.
    pub fn decode_chunk(&self, x: usize, z: usize) -> Result<Option<ChunkData>> {
        let Some(slot) = self.slots[Self::slot_index(x, z)?].as_ref() else {
            return Ok(None);
        };
        let record = slot.decompress()?;
        let mut r = Reader::new(&record);
        let version = r.read_u16().map_err(ChunkError::from)?;
        let chunk = match version {
            VERSION_V12 => v12::decode(&mut r)?,
            VERSION_V13 => v13::decode(&mut r)?,
            other => return Err(ChunkError::UnsupportedVersion(other).into()),
        };
        Ok(Some(chunk))
    }

    /// Encode `chunk` as `version` into slot `(x, z)`, compressing the
    /// record and keeping the slot's previous timestamp if it had one.
    pub fn encode_chunk(
        &mut self,
        x: usize,
        z: usize,
        chunk: &ChunkData,
        version: u16,
    ) -> Result<()> {
        let mut w = Writer::new();
        w.write_u16(version);
        match version {
            VERSION_V12 => v12::encode(chunk, &mut w)?,
            VERSION_V13 => v13::encode(chunk, &mut w)?,
            other => return Err(ChunkError::UnsupportedVersion(other).into()),
        }
        let record = w.into_vec();

        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&record)?;
        let payload = encoder.finish()?;

        let index = Self::slot_index(x, z)?;
        let timestamp = self.slots[index].as_ref().map_or(0, |s| s.timestamp);
        self.slots[index] = Some(RegionChunk {
            payload,
            timestamp,
            compression: Compression::Zlib,
            raw_len: record.len() as u32,
        });
        Ok(())
    }

    /// Decode and re-encode every present chunk in place. A slot whose
    /// record fails to decode is dropped; the others are untouched.
    pub fn recode(&mut self) -> Result<()> {
        for z in 0..REGION_WIDTH {
            for x in 0..REGION_WIDTH {
                match self.decode_chunk(x, z) {
                    Ok(Some(chunk)) => self.encode_chunk(x, z, &chunk, chunk.last_version)?,
                    Ok(None) => {}
                    Err(err) => {
                        warn!("dropping undecodable chunk ({x}, {z}): {err}");
                        self.clear_slot(x, z)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Re-encode every present chunk and serialize the region for a
    /// `target` byte order. Chunk interiors keep their own endian
    /// discipline; only the directory and envelope words change.
    pub fn convert(&mut self, target: Endian) -> Result<Vec<u8>> {
        self.recode()?;
        self.write(target)
    }

    /// Serialize the region, packing records contiguously from the first
    /// data sector and rebuilding both directory tables.
    pub fn write(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut w = Writer::with_endian(endian);
        w.seek(2 * SECTOR_SIZE);

        let mut next_sector = FIRST_DATA_SECTOR;
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(chunk) = slot else { continue };

            let record_len = 8 + chunk.payload.len();
            let sectors = record_len.div_ceil(SECTOR_SIZE);
            w.seek(next_sector * SECTOR_SIZE);
            let mut tagged = chunk.payload.len() as u32;
            if chunk.compression == Compression::Zlib {
                tagged |= 0x8000_0000;
            }
            w.write_u32(tagged);
            w.write_u32(chunk.raw_len);
            w.write_bytes(&chunk.payload);

            w.write_u32_at(4 * i, ((next_sector as u32) << 8) | sectors as u32);
            w.write_u32_at(SECTOR_SIZE + 4 * i, chunk.timestamp);
            next_sector += sectors;
        }

        // pad the tail out to a whole sector
        w.seek(next_sector * SECTOR_SIZE);
        Ok(w.into_vec())
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}
