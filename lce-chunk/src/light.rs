//! Light-data framing.
//!
//! Each light kind (sky, block) is 32 768 nibble-packed bytes split into two
//! 16 384-byte sub-blocks. A one-byte descriptor compresses the two uniform
//! cases: `0x00` = all-zero, `0xFF` = all-0xFF, anything else = 16 384 raw
//! bytes follow. v12 interleaves descriptor and payload per sub-block; v13
//! fronts the two descriptors of a light kind as a pair, payloads after.

use lce_io::{Reader, Writer};

use crate::Result;

const HALF: usize = 16 * 1024;

/// Descriptor value the writer uses for a non-uniform sub-block.
const RAW: u8 = 0x01;

fn fill_half(r: &mut Reader<'_>, descriptor: u8, out: &mut [u8]) -> Result<()> {
    match descriptor {
        0x00 => out.fill(0x00),
        0xFF => out.fill(0xFF),
        _ => r.read_exact(out)?,
    }
    Ok(())
}

fn half_descriptor(half: &[u8]) -> u8 {
    if half.iter().all(|&b| b == 0x00) {
        0x00
    } else if half.iter().all(|&b| b == 0xFF) {
        0xFF
    } else {
        RAW
    }
}

/// v12: `[descriptor][payload?]` twice.
pub(crate) fn decode_light_v12(r: &mut Reader<'_>, light: &mut [u8]) -> Result<()> {
    debug_assert_eq!(light.len(), 2 * HALF);
    let (first, second) = light.split_at_mut(HALF);
    let descriptor = r.read_u8()?;
    fill_half(r, descriptor, first)?;
    let descriptor = r.read_u8()?;
    fill_half(r, descriptor, second)
}

pub(crate) fn encode_light_v12(w: &mut Writer, light: &[u8]) {
    debug_assert_eq!(light.len(), 2 * HALF);
    for half in light.chunks_exact(HALF) {
        let descriptor = half_descriptor(half);
        w.write_u8(descriptor);
        if descriptor == RAW {
            w.write_bytes(half);
        }
    }
}

/// v13: `[descriptor][descriptor][payload?][payload?]`.
pub(crate) fn decode_light_v13(r: &mut Reader<'_>, light: &mut [u8]) -> Result<()> {
    debug_assert_eq!(light.len(), 2 * HALF);
    let first_descriptor = r.read_u8()?;
    let second_descriptor = r.read_u8()?;
    let (first, second) = light.split_at_mut(HALF);
    fill_half(r, first_descriptor, first)?;
    fill_half(r, second_descriptor, second)
}

pub(crate) fn encode_light_v13(w: &mut Writer, light: &[u8]) {
    debug_assert_eq!(light.len(), 2 * HALF);
    let (first, second) = light.split_at(HALF);
    let first_descriptor = half_descriptor(first);
    let second_descriptor = half_descriptor(second);
    w.write_u8(first_descriptor);
    w.write_u8(second_descriptor);
    if first_descriptor == RAW {
        w.write_bytes(first);
    }
    if second_descriptor == RAW {
        w.write_bytes(second);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_halves_collapse_to_descriptors() {
        let mut light = vec![0u8; 2 * HALF];
        light[HALF..].fill(0xFF);

        let mut w = Writer::new();
        encode_light_v12(&mut w, &light);
        assert_eq!(w.as_slice(), &[0x00, 0xFF]);

        let mut out = vec![0xAAu8; 2 * HALF];
        let bytes = w.into_vec();
        let mut r = Reader::new(&bytes);
        decode_light_v12(&mut r, &mut out).unwrap();
        assert_eq!(out, light);
    }

    #[test]
    fn test_raw_half_round_trip_v12() {
        let mut light = vec![0u8; 2 * HALF];
        light[3] = 0x42; // first half raw, second all-zero

        let mut w = Writer::new();
        encode_light_v12(&mut w, &light);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), 1 + HALF + 1);
        assert_eq!(bytes[0], RAW);
        assert_eq!(*bytes.last().unwrap(), 0x00);

        let mut out = vec![0u8; 2 * HALF];
        let mut r = Reader::new(&bytes);
        decode_light_v12(&mut r, &mut out).unwrap();
        assert_eq!(out, light);
    }

    #[test]
    fn test_paired_descriptors_v13() {
        let mut light = vec![0xFFu8; 2 * HALF];
        light[HALF + 9] = 0x0C; // second half raw

        let mut w = Writer::new();
        encode_light_v13(&mut w, &light);
        let bytes = w.into_vec();
        assert_eq!(bytes[0], 0xFF);
        assert_eq!(bytes[1], RAW);
        assert_eq!(bytes.len(), 2 + HALF);

        let mut out = vec![0u8; 2 * HALF];
        let mut r = Reader::new(&bytes);
        decode_light_v13(&mut r, &mut out).unwrap();
        assert_eq!(out, light);
    }
}
