
//! The game's four string banks and their shared character mapping.
//!
//! Every variant owns a logical string of glyphs and translates it
//! through a fixed charset, falling back to `{HH}` escapes for bytes
//! without a table entry. The variants differ in their framing: plain
//! strings are length-prefixed, intro strings carry five positioning
//! parameters, end-credit strings a graphics prefix and layout bytes,
//! and main-script strings run through the Huffman forest.
//!
//! Each variant offers `decode`/`encode` for the binary form and
//! `serialise`/`deserialise` for a tab-separated textual form with a
//! `header_row` describing its columns.

pub mod charmap;
pub mod charset;
pub mod bank;

mod plain;
mod intro;
mod credits;
mod main_string;

pub use self::charmap::Charmap;
pub use self::charset::{MAIN_CHARSET, INTRO_CHARSET, CREDITS_CHARSET};
pub use self::plain::PlainString;
pub use self::intro::IntroString;
pub use self::credits::CreditString;
pub use self::main_string::MainString;


/// What every string variant exposes, mirroring the charmap hook
/// the variants dispatch their glyph translation through.
pub trait GameString {

    /// The charset this variant translates against.
    fn charmap(&self) -> &'static Charmap;

    /// The logical text of this entry.
    fn text(&self) -> &str;

    /// Column headings for the tab-separated form.
    fn header_row() -> &'static str where Self: Sized;

    /// File extension for encoded data of this variant.
    fn encoded_file_extension() -> &'static str where Self: Sized;
}
