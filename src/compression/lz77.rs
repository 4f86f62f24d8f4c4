
//! Sliding-window byte LZ77, used for raw graphics assets and as the
//! optional compression mode of 2D tilemaps.
//!
//! The stream is a sequence of flagged items in an MSB-first bit stream:
//! a `1` bit announces a literal byte, a `0` bit a back-reference made of
//! a 12-bit distance and a 4-bit length field covering `length + 3`
//! bytes. A distance of zero terminates the stream. This scheme does not
//! share code with the 3D map codec, which runs its own bit-level LZ77
//! over 16-bit cells.

use crate::bits::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::map::Tilemap2D;
use super::{ByteVec, Bytes};


const WINDOW_SIZE: usize = 4095;
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = MIN_MATCH + 0xF;


/// Expand an LZ77 stream into the original bytes.
pub fn decompress(compressed: Bytes<'_>) -> Result<ByteVec> {
    let mut bits = BitReader::new(compressed);
    let mut decompressed = Vec::with_capacity(compressed.len() * 2);

    loop {
        if bits.read_bit()? {
            decompressed.push(bits.read_bits(8)? as u8);
            continue;
        }

        let distance = usize::from(bits.read_bits(12)?);
        if distance == 0 {
            break;
        }

        if distance > decompressed.len() {
            return Err(Error::corrupt(format!(
                "back-reference distance {} exceeds the {} bytes produced so far",
                distance, decompressed.len()
            )));
        }

        let length = usize::from(bits.read_bits(4)?) + MIN_MATCH;
        for _ in 0 .. length {
            // the copied range may overlap the write position
            let byte = decompressed[decompressed.len() - distance];
            decompressed.push(byte);
        }
    }

    Ok(decompressed)
}

/// Compress bytes with a greedy longest-match parse.
pub fn compress(uncompressed: Bytes<'_>) -> ByteVec {
    let mut bits = BitWriter::new();
    let mut position = 0;

    while position < uncompressed.len() {
        let (distance, length) = longest_match(uncompressed, position);

        if length >= MIN_MATCH {
            bits.write_bit(false);
            bits.write_bits(distance as u16, 12);
            bits.write_bits((length - MIN_MATCH) as u16, 4);
            position += length;
        }
        else {
            bits.write_bit(true);
            bits.write_bits(u16::from(uncompressed[position]), 8);
            position += 1;
        }
    }

    bits.write_bit(false);
    bits.write_bits(0, 12);
    bits.advance_to_next_byte();
    bits.into_bytes()
}

/// The longest match for `position` within the window, as (distance, length).
fn longest_match(bytes: &[u8], position: usize) -> (usize, usize) {
    let window = position.min(WINDOW_SIZE);
    let lookahead = (bytes.len() - position).min(MAX_MATCH);
    let mut best = (0, 0);

    for distance in 1 ..= window {
        let mut length = 0;
        while length < lookahead
            && bytes[position - distance + length] == bytes[position + length]
        {
            length += 1;
        }

        if length > best.1 {
            best = (distance, length);
        }
    }

    best
}


impl Tilemap2D {

    /// Read a tilemap stored as LZ77-compressed big-endian tile words.
    /// The width is external to this format; the height is derived
    /// from the decompressed word count.
    pub fn from_lz77(compressed: &[u8], width: u8) -> Result<Self> {
        Self::from_uncompressed(&decompress(compressed)?, width)
    }

    /// Write the tilemap as LZ77-compressed big-endian tile words.
    pub fn to_lz77(&self) -> ByteVec {
        compress(&self.to_uncompressed())
    }
}
