//! Tag stream reader and writer.

use lce_io::{Reader, Writer};
use tracing::trace;

use crate::{NbtError, Result, Tag, TagKind};

/// Nesting bound; real save documents stay in the single digits.
const MAX_DEPTH: usize = 512;

/// Read one root tag. The next byte must be the compound marker `0x0A`;
/// the root name is consumed and discarded (it is empty in every save file
/// this engine handles).
pub fn read_tag(r: &mut Reader) -> Result<Tag> {
    let marker = r.read_u8()?;
    if marker != TagKind::Compound.id() {
        return Err(NbtError::RootNotCompound(marker));
    }
    let name = read_name(r)?;
    trace!("reading root compound, name len {}", name.len());
    read_payload(r, TagKind::Compound, 0)
}

/// Write `tag` as a root document with an empty name.
pub fn write_tag(tag: &Tag, w: &mut Writer) -> Result<()> {
    w.write_u8(tag.kind().id());
    w.write_u16(0);
    write_payload(tag, w);
    Ok(())
}

fn read_name(r: &mut Reader) -> Result<String> {
    let len = r.read_u16()? as usize;
    let bytes = r.read_bytes(len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn read_payload(r: &mut Reader, kind: TagKind, depth: usize) -> Result<Tag> {
    if depth > MAX_DEPTH {
        return Err(NbtError::DepthLimit(MAX_DEPTH));
    }
    Ok(match kind {
        TagKind::End => return Err(NbtError::UnknownTagKind(0)),
        TagKind::Byte => Tag::Byte(r.read_u8()? as i8),
        TagKind::Short => Tag::Short(r.read_u16()? as i16),
        TagKind::Int => Tag::Int(r.read_u32()? as i32),
        TagKind::Long => Tag::Long(r.read_u64()? as i64),
        TagKind::Float => Tag::Float(f32::from_bits(r.read_u32()?)),
        TagKind::Double => Tag::Double(f64::from_bits(r.read_u64()?)),
        TagKind::ByteArray => {
            let len = r.read_u32()? as usize;
            Tag::ByteArray(r.read_bytes(len)?.to_vec())
        }
        TagKind::String => {
            let len = r.read_u16()? as usize;
            Tag::String(String::from_utf8_lossy(r.read_bytes(len)?).into_owned())
        }
        TagKind::List => {
            let elem_id = r.read_u8()?;
            let elem = TagKind::from_id(elem_id).ok_or(NbtError::UnknownTagKind(elem_id))?;
            let count = r.read_u32()? as usize;
            if elem == TagKind::End && count != 0 {
                return Err(NbtError::UnknownTagKind(0));
            }
            let mut items = Vec::with_capacity(count.min(0x10000));
            for _ in 0..count {
                items.push(read_payload(r, elem, depth + 1)?);
            }
            Tag::List { elem, items }
        }
        TagKind::Compound => {
            let mut pairs = Vec::new();
            loop {
                let id = r.read_u8()?;
                if id == TagKind::End.id() {
                    break;
                }
                let child = TagKind::from_id(id).ok_or(NbtError::UnknownTagKind(id))?;
                let name = read_name(r)?;
                pairs.push((name, read_payload(r, child, depth + 1)?));
            }
            Tag::Compound(pairs)
        }
        TagKind::IntArray => {
            let len = r.read_u32()? as usize;
            let mut values = Vec::with_capacity(len.min(0x10000));
            for _ in 0..len {
                values.push(r.read_u32()? as i32);
            }
            Tag::IntArray(values)
        }
        TagKind::LongArray => {
            let len = r.read_u32()? as usize;
            let mut values = Vec::with_capacity(len.min(0x10000));
            for _ in 0..len {
                values.push(r.read_u64()? as i64);
            }
            Tag::LongArray(values)
        }
    })
}

fn write_payload(tag: &Tag, w: &mut Writer) {
    match tag {
        Tag::Byte(v) => w.write_u8(*v as u8),
        Tag::Short(v) => w.write_u16(*v as u16),
        Tag::Int(v) => w.write_u32(*v as u32),
        Tag::Long(v) => w.write_u64(*v as u64),
        Tag::Float(v) => w.write_u32(v.to_bits()),
        Tag::Double(v) => w.write_u64(v.to_bits()),
        Tag::ByteArray(bytes) => {
            w.write_u32(bytes.len() as u32);
            w.write_bytes(bytes);
        }
        Tag::String(s) => {
            w.write_u16(s.len() as u16);
            w.write_bytes(s.as_bytes());
        }
        Tag::List { elem, items } => {
            w.write_u8(elem.id());
            w.write_u32(items.len() as u32);
            for item in items {
                write_payload(item, w);
            }
        }
        Tag::Compound(pairs) => {
            for (name, child) in pairs {
                w.write_u8(child.kind().id());
                w.write_u16(name.len() as u16);
                w.write_bytes(name.as_bytes());
                write_payload(child, w);
            }
            w.write_u8(TagKind::End.id());
        }
        Tag::IntArray(values) => {
            w.write_u32(values.len() as u32);
            for v in values {
                w.write_u32(*v as u32);
            }
        }
        Tag::LongArray(values) => {
            w.write_u32(values.len() as u32);
            for v in values {
                w.write_u64(*v as u64);
            }
        }
    }
}
