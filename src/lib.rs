
//! Read and write the binary asset formats of the Mega Drive game
//! Landstalker: the 2D and 3D tilemap codecs, the byte-level LZ77
//! scheme, the per-prefix Huffman forest, and the four string banks.
//!
//! Every codec is a pure transformation between caller-owned in-memory
//! buffers; file handling, ROM layout and rendering live elsewhere.

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
)]

#![deny(
    unused_variables,
    unused_assignments,
    dead_code,
    unused_must_use,
    trivial_numeric_casts,
)]

#![forbid(unsafe_code)]


pub mod error;
pub mod io;
pub mod bits;
pub mod map;
pub mod compression;
pub mod text;


/// Re-exports of the types most callers need.
pub mod prelude {

    // main exports
    pub use crate::map::{Tile, Tilemap2D, RoomTilemap};
    pub use crate::compression::{HuffmanForest, FrequencyCounts};
    pub use crate::text::{
        GameString, PlainString, IntroString, CreditString, MainString,
        MAIN_CHARSET, INTRO_CHARSET, CREDITS_CHARSET,
    };

    // secondary data types
    pub use crate::compression;
    pub use crate::error::{Result, Error};
}
