
//! The tilemap data model: packed tile words, flat 2D tilemaps,
//! and the dual-layer 3D room maps with their heightmap.
//! All types are plain values; the codecs in [`crate::compression`]
//! convert them to and from the on-disk formats.

use bit_field::BitField;
use crate::error::{Error, Result, UnitResult};


/// The reserved index that terminates 2D RLE streams.
/// It must not appear as a real tile index.
pub const INDEX_TERMINATOR: u16 = 0x7FF;

/// Room layer cells travel through 10-bit dictionary fields.
pub const MAX_ROOM_BLOCK: u16 = 0x3FF;


/// One cell of a 2D tilemap, packed the way the VDP consumes it:
/// `{ priority:1, palette:2, vflip:1, hflip:1, index:11 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile(u16);

impl Tile {

    /// Wrap a raw 16-bit tile word.
    pub fn from_value(value: u16) -> Self {
        Tile(value)
    }

    /// Build a tile from its parts. Fails if the palette or index is out of range.
    pub fn new(index: u16, hflip: bool, vflip: bool, palette: u8, priority: bool) -> Result<Self> {
        if index > INDEX_TERMINATOR {
            return Err(Error::invalid(format!("tile index {:#x} does not fit 11 bits", index)));
        }

        let mut tile = Tile(index);
        tile.0.set_bit(11, hflip);
        tile.0.set_bit(12, vflip);
        tile.set_palette(palette)?;
        tile.0.set_bit(15, priority);
        Ok(tile)
    }

    pub fn value(self) -> u16 { self.0 }

    pub fn index(self) -> u16 { self.0.get_bits(0 .. 11) }

    pub fn hflip(self) -> bool { self.0.get_bit(11) }

    pub fn vflip(self) -> bool { self.0.get_bit(12) }

    pub fn palette(self) -> u8 { self.0.get_bits(13 .. 15) as u8 }

    pub fn priority(self) -> bool { self.0.get_bit(15) }

    /// The top five bits, which the 2D RLE attribute section covers.
    pub fn attribute_bits(self) -> u16 { self.0 & 0xF800 }

    pub fn set_index(&mut self, index: u16) {
        self.0.set_bits(0 .. 11, index & INDEX_TERMINATOR);
    }

    pub fn set_palette(&mut self, palette: u8) -> UnitResult {
        if palette > 3 {
            return Err(Error::invalid(format!("palette index {} is greater than 3", palette)));
        }

        self.0.set_bits(13 .. 15, u16::from(palette));
        Ok(())
    }
}


/// A flat tilemap: `width * height` tiles in row-major order.
/// Both dimensions fit in a byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tilemap2D {
    width: u8,
    height: u8,
    tiles: Vec<Tile>,
}

impl Tilemap2D {

    /// An all-empty tilemap of the given dimensions.
    pub fn new(width: u8, height: u8) -> Self {
        Tilemap2D {
            width, height,
            tiles: vec![Tile::default(); usize::from(width) * usize::from(height)],
        }
    }

    /// Wrap an existing row-major tile sequence.
    /// Fails unless the sequence has exactly `width * height` entries.
    pub fn from_tiles(width: u8, height: u8, tiles: Vec<Tile>) -> Result<Self> {
        if tiles.len() != usize::from(width) * usize::from(height) {
            return Err(Error::invalid(format!(
                "tile count {} does not match {}x{} map", tiles.len(), width, height
            )));
        }

        Ok(Tilemap2D { width, height, tiles })
    }

    pub fn width(&self) -> u8 { self.width }

    pub fn height(&self) -> u8 { self.height }

    pub fn tiles(&self) -> &[Tile] { &self.tiles }

    pub fn tiles_mut(&mut self) -> &mut [Tile] { &mut self.tiles }

    pub fn get(&self, x: u8, y: u8) -> Option<Tile> {
        if x < self.width && y < self.height {
            Some(self.tiles[usize::from(y) * usize::from(self.width) + usize::from(x)])
        }
        else { None }
    }

    pub fn set(&mut self, x: u8, y: u8, tile: Tile) -> UnitResult {
        if x >= self.width || y >= self.height {
            return Err(Error::invalid(format!(
                "coordinate ({}, {}) outside {}x{} map", x, y, self.width, self.height
            )));
        }

        self.tiles[usize::from(y) * usize::from(self.width) + usize::from(x)] = tile;
        Ok(())
    }

    /// Read a tilemap stored as raw big-endian tile words.
    /// The width is external to this format; the height is derived
    /// from the word count.
    pub fn from_uncompressed(bytes: &[u8], width: u8) -> Result<Self> {
        if width == 0 {
            return Err(Error::invalid("tilemap width must not be zero"));
        }
        if bytes.len() % 2 != 0 {
            return Err(Error::corrupt("tilemap data ends mid-word"));
        }

        let words = bytes.len() / 2;
        if words % usize::from(width) != 0 || words / usize::from(width) > 0xFF {
            return Err(Error::corrupt(format!(
                "{} tile words do not form a width-{} map", words, width
            )));
        }

        let mut remaining = bytes;
        let mut tiles = Vec::with_capacity(words);
        for _ in 0 .. words {
            tiles.push(Tile::from_value(crate::io::take_u16_be(&mut remaining)?));
        }

        Self::from_tiles(width, (words / usize::from(width)) as u8, tiles)
    }

    /// Write the tilemap as raw big-endian tile words.
    pub fn to_uncompressed(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.tiles.len() * 2);
        for tile in &self.tiles {
            crate::io::put_u16_be(&mut bytes, tile.value());
        }
        bytes
    }
}


/// A dual-layer isometric room map plus its heightmap.
///
/// Both layers hold `width * height` room-block indices.
/// On disk the height is stored pre-doubled; the codec hides that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTilemap {
    pub left: u8,
    pub top: u8,
    pub width: u8,
    pub height: u8,

    pub foreground: Vec<u16>,
    pub background: Vec<u16>,

    pub hmwidth: u8,
    pub hmheight: u8,
    pub heightmap: Vec<u16>,
}

impl RoomTilemap {

    /// An all-zero room of the given dimensions.
    pub fn new(left: u8, top: u8, width: u8, height: u8, hmwidth: u8, hmheight: u8) -> Self {
        let cells = usize::from(width) * usize::from(height);
        RoomTilemap {
            left, top, width, height,
            foreground: vec![0; cells],
            background: vec![0; cells],
            hmwidth, hmheight,
            heightmap: vec![0; usize::from(hmwidth) * usize::from(hmheight)],
        }
    }

    /// Number of cells in one layer.
    pub fn layer_len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Check the dimension and range invariants the codec relies on.
    pub fn validate(&self) -> UnitResult {
        let cells = self.layer_len();
        if self.foreground.len() != cells || self.background.len() != cells {
            return Err(Error::invalid(format!(
                "layer lengths {}/{} do not match {}x{} room",
                self.foreground.len(), self.background.len(), self.width, self.height
            )));
        }

        if self.heightmap.len() != usize::from(self.hmwidth) * usize::from(self.hmheight) {
            return Err(Error::invalid(format!(
                "heightmap length {} does not match {}x{} grid",
                self.heightmap.len(), self.hmwidth, self.hmheight
            )));
        }

        let too_large = self.foreground.iter().chain(&self.background)
            .find(|&&block| block > MAX_ROOM_BLOCK);

        if let Some(block) = too_large {
            return Err(Error::invalid(format!("room block {:#x} does not fit 10 bits", block)));
        }

        Ok(())
    }
}
