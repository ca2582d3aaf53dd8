//! Bounds-checked read cursor over a borrowed byte buffer.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{Endian, IoError, Result};

/// Seekable read cursor over a borrowed byte slice.
///
/// All primitive reads fail with [`IoError::OutOfRange`] when fewer than the
/// required bytes remain; a failed read does not move the cursor.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> Reader<'a> {
    /// Create a big-endian reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_endian(data, Endian::Big)
    }

    /// Create a reader over `data` with an explicit byte order.
    pub fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Reader {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Switch the byte order applied to subsequent multi-byte reads.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(IoError::OutOfRange {
                offset: pos,
                len: 0,
                size: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.seek(self.pos + n)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(IoError::OutOfRange {
                offset: self.pos,
                len,
                size: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read the next byte without moving the cursor.
    pub fn peek_u8(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(IoError::OutOfRange {
                offset: self.pos,
                len: 1,
                size: self.data.len(),
            })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u16(b),
            Endian::Little => LittleEndian::read_u16(b),
        })
    }

    /// Read a 24-bit unsigned integer into the low bits of a `u32`.
    pub fn read_u24(&mut self) -> Result<u32> {
        let b = self.take(3)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u24(b),
            Endian::Little => LittleEndian::read_u24(b),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u32(b),
            Endian::Little => LittleEndian::read_u32(b),
        })
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(match self.endian {
            Endian::Big => BigEndian::read_u64(b),
            Endian::Little => LittleEndian::read_u64(b),
        })
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Fill `out` from the stream.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        out.copy_from_slice(self.take(out.len())?);
        Ok(())
    }

    /// Read a fixed `len`-byte window holding a NUL-padded byte string.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(len);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read a fixed window of `units` UTF-16 code units, NUL-terminated
    /// within the padded window. Units follow the cursor's byte order.
    pub fn read_wide_string(&mut self, units: usize) -> Result<String> {
        let start = self.pos;
        let mut code_units = Vec::with_capacity(units);
        for _ in 0..units {
            code_units.push(self.read_u16()?);
        }
        let end = code_units.iter().position(|&u| u == 0).unwrap_or(units);
        String::from_utf16(&code_units[..end]).map_err(|_| IoError::InvalidString(start))
    }

    /// Read UTF-16 code units up to (and consuming) the NUL terminator.
    pub fn read_wide_cstring(&mut self) -> Result<String> {
        let start = self.pos;
        let mut code_units = Vec::new();
        loop {
            let unit = self.read_u16()?;
            if unit == 0 {
                break;
            }
            code_units.push(unit);
        }
        String::from_utf16(&code_units).map_err(|_| IoError::InvalidString(start))
    }
}
