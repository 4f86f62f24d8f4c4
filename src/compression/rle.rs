
//! The dual-pass RLE scheme of flat 2D tilemaps.
//!
//! A stream opens with one `width` byte and one `height` byte, followed
//! by two sections. The first run-length codes the attribute bits (the
//! top five bits of every tile word), the second codes the tile indices
//! with four command classes selected by a 2-bit prefix: literal word,
//! fill with a new value, fill with the most recent value, and
//! incrementing fill. The literal word `0x07FF` terminates the stream,
//! which reserves that index value.

use crate::error::{Error, Result};
use crate::io::{take_1, take_u16_be, peek};
use crate::map::{Tile, Tilemap2D, INDEX_TERMINATOR};
use super::ByteVec;


// run lengths are stored minus one in 2, 10, 3 and 6 bit fields
const MAX_ATTRIBUTE_EXTRAS: usize = 0x3FF;
const MAX_FILL_EXTRAS: usize = 0x07;
const MAX_REPEAT_EXTRAS: usize = 0x3F;


impl Tilemap2D {

    /// Decode an RLE-compressed tilemap.
    pub fn decompress(compressed: &[u8]) -> Result<Self> {
        let mut remaining = compressed;

        let width = take_1(&mut remaining)?;
        let height = take_1(&mut remaining)?;
        let cell_count = usize::from(width) * usize::from(height);

        let tiles = decode_attribute_runs(&mut remaining, cell_count)?;
        let mut map = Tilemap2D::from_tiles(width, height, tiles)?;
        decode_index_commands(&mut remaining, map.tiles_mut())?;

        Ok(map)
    }

    /// Encode the tilemap. The output decodes back to an equal map.
    pub fn compress(&self) -> Result<ByteVec> {
        if let Some(tile) = self.tiles().iter().find(|tile| tile.index() == INDEX_TERMINATOR) {
            return Err(Error::invalid(format!(
                "tile index {:#x} is reserved as the stream terminator", tile.index()
            )));
        }

        let mut compressed = vec![self.width(), self.height()];
        encode_attribute_runs(self.tiles(), &mut compressed);
        encode_index_commands(self.tiles(), &mut compressed);

        Ok(compressed)
    }
}


/// Expand the attribute section into tiles carrying only their top five bits.
fn decode_attribute_runs(remaining: &mut &[u8], cell_count: usize) -> Result<Vec<Tile>> {
    let mut tiles = Vec::with_capacity(cell_count);

    loop {
        let first = take_1(remaining)?;
        let attributes = u16::from(first & 0xF8) << 8;

        let run = if first & 0x04 != 0 {
            usize::from(first & 0x03) + 1
        }
        else {
            let second = take_1(remaining)?;
            let stored = usize::from(first & 0x03) << 8 | usize::from(second);
            if stored == 0 {
                break; // end of attributes
            }
            stored + 1
        };

        if tiles.len() + run > cell_count {
            return Err(Error::corrupt("attribute runs overflow the tilemap"));
        }

        for _ in 0 .. run {
            tiles.push(Tile::from_value(attributes));
        }
    }

    if tiles.len() != cell_count {
        return Err(Error::corrupt(format!(
            "attribute runs cover {} of {} cells", tiles.len(), cell_count
        )));
    }

    Ok(tiles)
}

/// Apply the index command section onto attribute-initialised tiles.
fn decode_index_commands(remaining: &mut &[u8], tiles: &mut [Tile]) -> Result<()> {
    let mut position = 0;
    let mut last = None;
    let mut increment = None;

    loop {
        match peek(remaining, 0)? >> 6 {

            // literal word, or the terminator
            0 => {
                let value = take_u16_be(remaining)? & INDEX_TERMINATOR;
                if value == INDEX_TERMINATOR {
                    return Ok(());
                }

                set_run(tiles, &mut position, value, 1)?;
            }

            // fill with a new value
            1 => {
                let word = take_u16_be(remaining)?;
                let run = usize::from(word >> 11 & 0x07) + 1;
                let value = word & INDEX_TERMINATOR;

                set_run(tiles, &mut position, value, run)?;
                last = Some(value);
                if increment.is_none() {
                    increment = Some(value);
                }
            }

            // fill with the most recent value
            2 => {
                let run = usize::from(take_1(remaining)? & 0x3F) + 1;
                let value = last
                    .ok_or_else(|| Error::corrupt("repeat command before any fill command"))?;

                set_run(tiles, &mut position, value, run)?;
            }

            // incrementing fill
            _ => {
                let run = usize::from(take_1(remaining)? & 0x3F) + 1;
                let base = increment.as_mut()
                    .ok_or_else(|| Error::corrupt("increment command before any fill command"))?;

                for _ in 0 .. run {
                    *base = base.wrapping_add(1);
                    set_run(tiles, &mut position, *base, 1)?;
                }
            }
        }
    }
}

fn set_run(tiles: &mut [Tile], position: &mut usize, value: u16, run: usize) -> Result<()> {
    if *position + run > tiles.len() {
        return Err(Error::corrupt("index runs overflow the tilemap"));
    }

    for tile in &mut tiles[*position .. *position + run] {
        tile.set_index(value);
    }

    *position += run;
    Ok(())
}


fn encode_attribute_runs(tiles: &[Tile], compressed: &mut Vec<u8>) {
    let mut position = 0;

    while position < tiles.len() {
        let attributes = tiles[position].attribute_bits();

        let mut extras = 0;
        while position + extras + 1 < tiles.len()
            && extras < MAX_ATTRIBUTE_EXTRAS
            && tiles[position + extras + 1].attribute_bits() == attributes
        {
            extras += 1;
        }

        let first = (attributes >> 8) as u8;
        if extras > 3 {
            compressed.push(first | (extras >> 8) as u8);
            compressed.push(extras as u8);
        }
        else {
            compressed.push(first | 0x04 | extras as u8);
        }

        position += extras + 1;
    }

    compressed.push(0x00);
    compressed.push(0x00);
}

fn encode_index_commands(tiles: &[Tile], compressed: &mut Vec<u8>) {
    if tiles.is_empty() {
        compressed.push(0x07);
        compressed.push(0xFF);
        return;
    }

    // one leading fill command seeds the repeat and increment registers
    let mut last = tiles[0].index();
    let mut increment = last;

    let extras = run_of(tiles, 0, last, MAX_FILL_EXTRAS);
    compressed.push(0x40 | (extras as u8) << 3 | (last >> 8) as u8 & 0x07);
    compressed.push(last as u8);

    let mut position = extras + 1;
    while position < tiles.len() {
        let index = tiles[position].index();

        if index == last {
            let extras = run_of(tiles, position, last, MAX_REPEAT_EXTRAS);
            compressed.push(0x80 | extras as u8);
            position += extras + 1;
        }
        else if index == increment + 1 {
            increment += 1;

            let mut extras = 0;
            while position + extras + 1 < tiles.len()
                && extras < MAX_REPEAT_EXTRAS
                && tiles[position + extras + 1].index() == increment + 1
            {
                increment += 1;
                extras += 1;
            }

            compressed.push(0xC0 | extras as u8);
            position += extras + 1;
        }
        else if tiles.get(position + 1).map(|tile| tile.index()) == Some(index) {
            let extras = run_of(tiles, position, index, MAX_FILL_EXTRAS);
            compressed.push(0x40 | (extras as u8) << 3 | (index >> 8) as u8 & 0x07);
            compressed.push(index as u8);

            last = index;
            position += extras + 1;
        }
        else {
            compressed.push((index >> 8) as u8);
            compressed.push(index as u8);
            position += 1;
        }
    }

    compressed.push(0x07);
    compressed.push(0xFF);
}

/// How many tiles after `position` continue the run of `value`, capped.
fn run_of(tiles: &[Tile], position: usize, value: u16, cap: usize) -> usize {
    let mut extras = 0;
    while position + extras + 1 < tiles.len()
        && extras < cap
        && tiles[position + extras + 1].index() == value
    {
        extras += 1;
    }

    extras
}
