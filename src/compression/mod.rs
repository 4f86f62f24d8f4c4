
//! The game's compression schemes.
//!
//! Each scheme is a pure transformation between in-memory buffers:
//! no module here performs any I/O. [`lz77`] is the byte-level scheme
//! shared by raw graphics assets, [`rle`] and [`room`] are the 2D and
//! 3D tilemap codecs, and [`huffman`] is the per-prefix forest behind
//! the main script text.

pub mod lz77;
pub mod rle;
pub mod room;
pub mod huffman;

pub use huffman::{HuffmanForest, FrequencyCounts};


/// A byte vector.
pub type ByteVec = Vec<u8>;

/// A byte slice.
pub type Bytes<'s> = &'s [u8];
