
//! The 3D room tilemap codec.
//!
//! A room stream packs both tile layers through one bit stream in three
//! stages, then appends a byte-aligned heightmap tail:
//!
//! 1. a sparse skeleton of `(coded step, back-offset command, optional
//!    vertical run)` records, placing back-offset values into a working
//!    buffer of `2 * width * height` cells;
//! 2. a forward fill that either copies cells from `address - offset`
//!    or, at literal markers, materialises cells from 2-bit tile
//!    operands driven by two learned dictionary counters;
//! 3. a run-length coded heightmap of 16-bit patterns.
//!
//! Compression learns two dictionaries from the tile data: the eight
//! non-hard-wired back-offsets and the two counter seed values. Both
//! searches are heuristic, so re-compressing a decoded room is not
//! guaranteed to reproduce the identical bit stream, only an equivalent
//! one.

use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::bits::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::map::RoomTilemap;
use super::ByteVec;


/// The buffer value marking "literal run starts here".
const LITERAL_MARKER: u16 = 0xFFFF;

/// Offset dictionary slot for literal runs.
const LITERAL_SLOT: usize = 0;

const DICTIONARY_SLOTS: usize = 14;
const LEARNED_SLOTS: usize = 8;
const WINDOW_SIZE: usize = 4095;


impl RoomTilemap {

    /// Decode a compressed room.
    pub fn decompress(compressed: &[u8]) -> Result<Self> {
        let mut bits = BitReader::new(compressed);

        let left = bits.read_bits(8)? as u8;
        let top = bits.read_bits(8)? as u8;
        let width = usize::from(bits.read_bits(8)?) + 1;
        let height = (usize::from(bits.read_bits(8)?) + 1) / 2;

        if width > 0xFF {
            return Err(Error::corrupt("room width does not fit in a byte"));
        }

        let cell_count = width * height * 2;
        let mut buffer = vec![0_u16; cell_count];

        // the first word seeds the increment counter, the second the literal counter
        let increment_seed = bits.read_bits(10)?;
        let literal_seed = bits.read_bits(10)?;

        let mut offsets = [0_u16; DICTIONARY_SLOTS];
        offsets[.. 6].copy_from_slice(&[
            LITERAL_MARKER, 1, 2, width as u16, width as u16 * 2, width as u16 + 1,
        ]);
        for slot in &mut offsets[6 ..] {
            *slot = bits.read_bits(12)?;
        }

        decode_skeleton(&mut bits, &offsets, &mut buffer, width)?;
        decode_tile_fill(&mut bits, &mut buffer, increment_seed, literal_seed)?;

        let background = buffer.split_off(cell_count / 2);
        let foreground = buffer;

        bits.advance_to_next_byte();
        let hmwidth = bits.read_bits(8)? as u8;
        let hmheight = bits.read_bits(8)? as u8;
        let heightmap = decode_heightmap(&mut bits, usize::from(hmwidth) * usize::from(hmheight))?;

        Ok(RoomTilemap {
            left, top,
            width: width as u8, height: height as u8,
            foreground, background,
            hmwidth, hmheight, heightmap,
        })
    }

    /// Encode the room. The output decodes back to an equal room.
    pub fn compress(&self) -> Result<ByteVec> {
        self.validate()?;
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid("room layers must not be empty"));
        }
        if self.height > 128 {
            return Err(Error::invalid("room height does not fit the doubled header byte"));
        }

        let width = usize::from(self.width);
        let mut tiles = Vec::with_capacity(self.layer_len() * 2);
        tiles.extend_from_slice(&self.foreground);
        tiles.extend_from_slice(&self.background);

        let offsets = learn_offsets(&tiles, width);
        let (records, literal_cells) = parse_skeleton(&tiles, width, &offsets);
        let (increment_seed, literal_seed) = select_tile_dictionary(&tiles, &literal_cells);
        let operands = emit_operands(&tiles, &literal_cells, increment_seed, literal_seed);

        let mut bits = BitWriter::new();
        bits.write_byte(self.left);
        bits.write_byte(self.top);
        bits.write_byte(self.width - 1);
        bits.write_byte((u16::from(self.height) * 2 - 1) as u8);

        bits.write_bits(increment_seed, 10);
        bits.write_bits(literal_seed, 10);
        for slot in &offsets[6 ..] {
            bits.write_bits(*slot, 12);
        }

        write_skeleton(&mut bits, &records, tiles.len());
        for operand in &operands {
            bits.write_bits(u16::from(operand.code), 2);
            if operand.code <= 1 {
                bits.write_bits(operand.data, operand.data_length);
            }
        }

        bits.advance_to_next_byte();
        bits.write_byte(self.hmwidth);
        bits.write_byte(self.hmheight);
        write_heightmap(&mut bits, &self.heightmap);

        Ok(bits.into_bytes())
    }

    /// Encode the room into a caller-owned buffer,
    /// returning the number of bytes produced.
    pub fn compress_into(&self, destination: &mut [u8]) -> Result<usize> {
        let compressed = self.compress()?;

        if compressed.len() > destination.len() {
            return Err(Error::overflowing_output(format!(
                "compressed room needs {} bytes, buffer holds {}",
                compressed.len(), destination.len()
            )));
        }

        destination[.. compressed.len()].copy_from_slice(&compressed);
        Ok(compressed.len())
    }
}


/// Position of the highest set bit plus one; zero for zero.
fn ilog2(mut value: u32) -> u32 {
    let mut result = 0;
    while value != 0 {
        value >>= 1;
        result += 1;
    }
    result
}

/// Read a unary-exponent coded number: `e` zero bits, a one bit,
/// then `e` mantissa bits, giving `2^e + mantissa`.
fn read_coded_number(bits: &mut BitReader<'_>) -> Result<u16> {
    let mut exponent = 0;
    while !bits.read_bit()? {
        exponent += 1;
        if exponent > 15 {
            return Err(Error::corrupt("coded number does not fit 16 bits"));
        }
    }

    if exponent == 0 { Ok(0) }
    else { Ok((1 << exponent) + bits.read_bits(exponent)?) }
}

fn write_coded_number(bits: &mut BitWriter, value: u16) {
    debug_assert_ne!(value, 0, "coded numbers start at one");

    let exponent = ilog2(u32::from(value)) - 1;
    let mantissa = value - (1 << exponent);

    for _ in 0 .. exponent {
        bits.write_bit(false);
    }
    bits.write_bit(true);

    if exponent > 0 {
        bits.write_bits(mantissa, exponent);
    }
}


/// Stage 1 of decoding: place back-offset values into the working buffer.
fn decode_skeleton(
    bits: &mut BitReader<'_>,
    offsets: &[u16; DICTIONARY_SLOTS],
    buffer: &mut [u16],
    width: usize,
) -> Result<()>
{
    let cell_count = buffer.len();
    let mut address = -1_i32;

    loop {
        let step = read_coded_number(bits)?.max(1);
        address += i32::from(step);

        if address as usize >= cell_count {
            return Ok(());
        }

        let mut command = usize::from(bits.read_bits(3)?);
        if command > 5 {
            command = 6 + (((command & 1) << 2) | usize::from(bits.read_bits(2)?));
        }

        buffer[address as usize] = offsets[command];

        // optional vertical extension, alternating between
        // straight down and down-right runs
        if bits.read_bit()? {
            let mut row = address as usize;
            let mut diagonal = bits.read_bit()?;

            loop {
                loop {
                    row += width + usize::from(diagonal);
                    if row >= cell_count {
                        return Err(Error::corrupt("vertical run leaves the room"));
                    }

                    buffer[row] = offsets[command];
                    if !bits.read_bit()? { break; }
                }

                diagonal = !diagonal;
                if !bits.read_bit()? { break; }
            }
        }
    }
}

/// Stage 2 of decoding: resolve every cell to a tile value,
/// copying backwards or consuming 2-bit tile operands.
fn decode_tile_fill(
    bits: &mut BitReader<'_>,
    buffer: &mut [u16],
    increment_seed: u16,
    literal_seed: u16,
) -> Result<()>
{
    let cell_count = buffer.len();
    let mut increment_counter = u32::from(increment_seed);
    let mut literal_counter = u32::from(literal_seed);
    let mut address = 0;

    while address < cell_count {
        let marker = buffer[address];

        if marker != LITERAL_MARKER {
            let distance = usize::from(marker);
            if distance == 0 || distance > address {
                return Err(Error::corrupt(format!(
                    "cell {} copies from before the buffer", address
                )));
            }

            let mut source = address - distance;
            loop {
                buffer[address] = buffer[source];
                address += 1;
                source += 1;

                if address >= cell_count || buffer[address] != 0 { break; }
            }
        }
        else {
            loop {
                let value = match bits.read_bits(2)? {

                    0 => {
                        if literal_counter == 0 { 0 }
                        else { u32::from(bits.read_bits(ilog2(literal_counter))?) }
                    }

                    1 => {
                        let range = increment_counter - u32::from(increment_seed);
                        let relative =
                            if range == 0 { 0 }
                            else { u32::from(bits.read_bits(ilog2(range))?) };
                        relative + u32::from(increment_seed)
                    }

                    2 => { literal_counter += 1; literal_counter - 1 }

                    _ => { increment_counter += 1; increment_counter - 1 }
                };

                buffer[address] = value as u16;
                address += 1;

                if address >= cell_count || buffer[address] != 0 { break; }
            }
        }
    }

    Ok(())
}

/// Stage 3 of decoding: the byte-aligned heightmap runs.
fn decode_heightmap(bits: &mut BitReader<'_>, cell_count: usize) -> Result<Vec<u16>> {
    let mut heightmap = Vec::with_capacity(cell_count);
    let mut pattern = 0;
    let mut remaining = 0_usize;

    for _ in 0 .. cell_count {
        if remaining == 0 {
            pattern = bits.read_bits(16)?;

            let mut length = 0_usize;
            loop {
                let byte = bits.read_bits(8)?;
                length += usize::from(byte);
                if byte != 0xFF { break; }
            }

            remaining = length + 1;
        }

        heightmap.push(pattern);
        remaining -= 1;
    }

    Ok(heightmap)
}


/// How far the cells at `position` repeat the cells `distance` back.
fn match_run(tiles: &[u16], position: usize, distance: usize) -> usize {
    let mut run = 0;
    while position + run < tiles.len()
        && tiles[position - distance + run] == tiles[position + run]
    {
        run += 1;
    }
    run
}

/// Scan the whole buffer for ≥ 2-cell matches and score every distance
/// achieving the best run at each position by its matched cell count.
/// Returns the hard-wired dictionary extended with the top learned offsets.
fn learn_offsets(tiles: &[u16], width: usize) -> [u16; DICTIONARY_SLOTS] {
    let mut scores: BTreeMap<usize, usize> = BTreeMap::new();
    let mut position = 1;

    while position < tiles.len() {
        let window = position.min(WINDOW_SIZE);
        let best = (1 ..= window)
            .map(|distance| match_run(tiles, position, distance))
            .max().unwrap_or(0);

        if best < 2 {
            position += 1;
            continue;
        }

        for distance in 1 ..= window {
            if match_run(tiles, position, distance) == best {
                *scores.entry(distance).or_insert(0) += best;
            }
        }

        position += best;
    }

    let mut offsets = [0_u16; DICTIONARY_SLOTS];
    offsets[.. 6].copy_from_slice(&[
        0, 1, 2, width as u16, width as u16 * 2, width as u16 + 1,
    ]);

    let mut ranked: Vec<(usize, usize)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut slot = 6;
    for (distance, _score) in ranked {
        if slot == 6 + LEARNED_SLOTS { break; }
        let distance = distance as u16;

        if !offsets[.. slot].contains(&distance) {
            offsets[slot] = distance;
            slot += 1;
        }
    }

    offsets
}


/// One stage-1 record: a back-offset (or literal marker) placed at a cell,
/// possibly extended by alternating vertical runs.
struct SkeletonRecord {
    index: usize,
    slot: usize,
    vertical: SmallVec<[(bool, usize); 4]>,
    merged: bool,
}

/// Greedy stage-1 parse: at each cell choose the dictionary offset with
/// the longest ≥ 2-cell match, falling back to literal cells, then
/// coalesce vertically adjacent same-offset records.
/// Also returns the literal flags telling which cells need tile operands.
fn parse_skeleton(
    tiles: &[u16],
    width: usize,
    offsets: &[u16; DICTIONARY_SLOTS],
) -> (Vec<SkeletonRecord>, Vec<bool>)
{
    let mut records = vec![SkeletonRecord {
        index: 0, slot: LITERAL_SLOT, vertical: SmallVec::new(), merged: false,
    }];

    let mut literal = vec![false; tiles.len()];
    literal[0] = true;

    let mut position = 1;
    while position < tiles.len() {
        let window = position.min(WINDOW_SIZE);

        let mut best_slot = LITERAL_SLOT;
        let mut best_run = 0;
        for (slot, &offset) in offsets.iter().enumerate() {
            let distance = usize::from(offset);
            if distance == 0 || distance > window { continue; }

            let run = match_run(tiles, position, distance);
            if run > best_run {
                best_run = run;
                best_slot = slot;
            }
        }

        if best_slot == LITERAL_SLOT || best_run < 2 {
            if records.last().map(|record| record.slot) != Some(LITERAL_SLOT) {
                records.push(SkeletonRecord {
                    index: position, slot: LITERAL_SLOT,
                    vertical: SmallVec::new(), merged: false,
                });
            }

            literal[position] = true;
            position += 1;
        }
        else {
            records.push(SkeletonRecord {
                index: position, slot: best_slot,
                vertical: SmallVec::new(), merged: false,
            });
            position += best_run;
        }
    }

    coalesce_vertically(&mut records, tiles.len(), width);
    records.retain(|record| !record.merged);

    (records, literal)
}

/// Fold records repeating the same offset straight down or down-right
/// into vertical run descriptors on the topmost record.
fn coalesce_vertically(records: &mut Vec<SkeletonRecord>, cell_count: usize, width: usize) {
    for current in 0 .. records.len() {
        if records[current].merged { continue; }

        let slot = records[current].slot;
        let mut next = records[current].index;
        let mut previous = next;
        let mut diagonal = false;
        let mut begin = true;
        let mut run = 0;

        while next < cell_count {
            next += width + usize::from(diagonal);

            let found = records[current + 1 ..].iter().position(|record|
                record.index == next && record.slot == slot && !record.merged);

            match found {
                Some(offset) => {
                    records[current + 1 + offset].merged = true;
                    run += 1;
                    previous = next;
                }

                None => {
                    // a probe past the buffer edge also lands here,
                    // closing any pending run
                    if run > 0 {
                        records[current].vertical.push((diagonal, run));
                        run = 0;
                    }
                    else if !begin {
                        break;
                    }

                    begin = false;
                    diagonal = !diagonal;
                    next = previous;
                }
            }
        }
    }
}

fn write_skeleton(bits: &mut BitWriter, records: &[SkeletonRecord], cell_count: usize) {
    let mut last_index = -1_i64;

    for record in records {
        write_coded_number(bits, (record.index as i64 - last_index) as u16);
        last_index = record.index as i64;

        if record.slot < 6 {
            bits.write_bits(record.slot as u16, 3);
        }
        else {
            bits.write_bits(0b11, 2);
            bits.write_bits((record.slot - 6) as u16, 3);
        }

        if record.vertical.is_empty() {
            bits.write_bit(false);
        }
        else {
            bits.write_bit(true);

            for (position, &(diagonal, run)) in record.vertical.iter().enumerate() {
                // the first bit selects the direction, later runs are
                // announced by a continuation bit and alternate implicitly
                bits.write_bit(if position == 0 { diagonal } else { true });

                for _ in 1 .. run {
                    bits.write_bit(true);
                }
                bits.write_bit(false);
            }

            bits.write_bit(false);
        }
    }

    // a final step past the buffer terminates stage 1
    write_coded_number(bits, (cell_count as i64 - last_index + 1) as u16);
}


/// Count, per distinct literal tile value, how often it starts or
/// continues an incrementing sequence, then pick the two counter seeds:
/// the most frequent sequence start, and the smallest start at or above
/// half the magnitude of the largest literal value.
fn select_tile_dictionary(tiles: &[u16], literal_cells: &[bool]) -> (u16, u16) {
    let mut starts: BTreeMap<u16, u32> = BTreeMap::new();

    for (position, &value) in tiles.iter().enumerate() {
        if !literal_cells[position] { continue; }

        for (&start, count) in starts.iter_mut() {
            if u32::from(value) == u32::from(start) + *count {
                *count += 1;
            }
        }

        starts.entry(value).or_insert(1);
    }

    if starts.is_empty() {
        return (0, 0);
    }

    let mut by_frequency: Vec<(u16, u32)> = starts.iter()
        .map(|(&start, &count)| (start, count)).collect();
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let increment_seed = by_frequency[0].0;

    let largest = *starts.keys().next_back().expect("start table is empty");
    let threshold =
        if largest == 0 { 0 }
        else { 1 << (ilog2(u32::from(largest)) - 1) };

    let literal_seed = starts.keys()
        .find(|&&start| start >= threshold)
        .copied().unwrap_or(threshold);

    (increment_seed, literal_seed)
}


struct TileOperand {
    code: u8,
    data: u16,
    data_length: u32,
}

/// Choose a 2-bit operand for every literal cell, preferring the
/// incrementing counters, then the counter-relative forms.
/// Data widths track the live counters, matching what the decoder reads.
fn emit_operands(
    tiles: &[u16],
    literal_cells: &[bool],
    increment_seed: u16,
    literal_seed: u16,
) -> Vec<TileOperand>
{
    let mut operands = Vec::new();
    let mut increment_count = 0_u32;
    let mut literal_count = 0_u32;

    for (position, &value) in tiles.iter().enumerate() {
        if !literal_cells[position] { continue; }
        let value = u32::from(value);

        if value == u32::from(increment_seed) + increment_count {
            increment_count += 1;
            operands.push(TileOperand { code: 3, data: 0, data_length: 0 });
        }
        else if value == u32::from(literal_seed) + literal_count {
            literal_count += 1;
            operands.push(TileOperand { code: 2, data: 0, data_length: 0 });
        }
        else if value >= u32::from(increment_seed)
            && value < u32::from(increment_seed) + increment_count
        {
            operands.push(TileOperand {
                code: 1,
                data: (value - u32::from(increment_seed)) as u16,
                data_length: ilog2(increment_count),
            });
        }
        else {
            operands.push(TileOperand {
                code: 0,
                data: value as u16,
                data_length: ilog2(u32::from(literal_seed) + literal_count),
            });
        }
    }

    operands
}


fn write_heightmap(bits: &mut BitWriter, heightmap: &[u16]) {
    let mut runs: Vec<(u16, usize)> = Vec::new();

    for &cell in heightmap {
        match runs.last_mut() {
            Some((pattern, extras)) if *pattern == cell => *extras += 1,
            _ => runs.push((cell, 0)),
        }
    }

    for (pattern, extras) in runs {
        bits.write_u16_be(pattern);

        let mut length = extras;
        while length >= 0xFF {
            bits.write_byte(0xFF);
            length -= 0xFF;
        }
        bits.write_byte(length as u8);
    }
}
