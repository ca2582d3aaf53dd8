//! The flat archive listing: header, payload run, metadata footer.

use lce_io::{Reader, Writer};
use tracing::debug;

use crate::{Console, InnerFile, Result, SaveArchive, SaveError};

/// Code units in a footer name window.
const NAME_UNITS: usize = 64;
const HEADER_SIZE: u32 = 12;

/// Parse an archive listing in `console`'s byte order.
pub(crate) fn read(bytes: &[u8], console: Console) -> Result<SaveArchive> {
    let mut r = Reader::with_endian(bytes, console.endian());

    let index_offset = r.read_u32()?;
    let mut file_count = r.read_u32()?;
    let oldest_version = r.read_u16()?;
    let current_version = r.read_u16()?;

    // version 1 footers are 136 bytes and the count arrives pre-multiplied
    let entry_size: u32 = if current_version > 1 {
        144
    } else {
        file_count /= 136;
        136
    };
    debug!(
        "listing: {file_count} files, versions {oldest_version}/{current_version}, index at {index_offset:#x}"
    );

    // a wrong-endian or non-listing read lands on an impossible footer
    let footer_end = (index_offset as u64) + (file_count as u64) * (entry_size as u64);
    if (index_offset as usize) < HEADER_SIZE as usize || footer_end > bytes.len() as u64 {
        return Err(SaveError::UnknownConsole(console.name().to_string()));
    }

    let mut files = Vec::with_capacity(file_count as usize);
    for i in 0..file_count {
        r.seek((index_offset + i * entry_size) as usize)?;
        let name = r.read_wide_string(NAME_UNITS)?;
        let size = r.read_u32()?;
        let offset = r.read_u32()?;
        let timestamp = if current_version > 1 { r.read_u64()? } else { 0 };

        r.seek(offset as usize)?;
        let payload = r.read_bytes(size as usize)?.to_vec();
        files.push(InnerFile::new(name, timestamp, payload));
    }

    Ok(SaveArchive {
        console,
        oldest_version,
        current_version,
        files,
    })
}

/// Serialize the archive listing in `console`'s byte order. Only kinds that
/// belong in a save are written; anything unrecognised is left out.
pub(crate) fn write(archive: &SaveArchive, console: Console) -> Result<Vec<u8>> {
    let written: Vec<&InnerFile> = archive
        .files
        .iter()
        .filter(|f| f.kind.written_on_rewrite())
        .collect();

    let entry_size = if archive.current_version > 1 { 144 } else { 136 };
    let multiplier: u32 = if archive.current_version > 1 { 1 } else { 136 };

    let payload_total: usize = written.iter().map(|f| f.payload.len()).sum();
    let index_offset = HEADER_SIZE as usize + payload_total;
    let total = index_offset + entry_size * written.len();

    let mut w = Writer::with_capacity(total, console.endian());
    w.write_u32(index_offset as u32);
    w.write_u32(written.len() as u32 * multiplier);
    w.write_u16(archive.oldest_version);
    w.write_u16(archive.current_version);

    let mut offsets = Vec::with_capacity(written.len());
    for file in &written {
        offsets.push(w.pos() as u32);
        w.write_bytes(&file.payload);
    }

    for (file, offset) in written.iter().zip(offsets) {
        w.write_wide_string(&file.construct_name(), NAME_UNITS);
        w.write_u32(file.payload.len() as u32);
        w.write_u32(offset);
        if archive.current_version > 1 {
            w.write_u64(file.timestamp);
        }
    }

    Ok(w.into_vec())
}
