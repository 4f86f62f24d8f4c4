
//! Table-driven translation between encoded bytes and readable glyphs.

use crate::error::{Error, Result};


/// An ordered mapping from encoded bytes to glyph strings.
///
/// Decoding a byte without an entry produces an `{HH}` escape with two
/// uppercase hex digits. Encoding consumes the first entry, in table
/// order, whose glyph is a prefix of the remaining input; tables must
/// not contain prefix-ambiguous entries.
#[derive(Debug)]
pub struct Charmap {
    pub(crate) entries: &'static [(u8, &'static str)],
}

impl Charmap {

    /// The glyph for one encoded byte.
    pub fn decode_byte(&self, byte: u8) -> String {
        match self.entries.iter().find(|(value, _)| *value == byte) {
            Some((_, glyph)) => (*glyph).to_string(),
            None => format!("{{{:02X}}}", byte),
        }
    }

    /// The encoded byte for the glyph at the start of `text`,
    /// and how many characters it consumed.
    pub fn encode_next(&self, text: &str) -> Result<(u8, usize)> {
        for (value, glyph) in self.entries {
            if text.starts_with(glyph) {
                return Ok((*value, glyph.len()));
            }
        }

        if let Some(group) = text.strip_prefix('{') {
            let digits = group.split('}').next().unwrap_or("");
            if digits.len() == group.len() {
                return Err(Error::invalid_glyph(format!("unterminated escape in {:?}", text)));
            }

            if digits.is_empty() || !digits.chars().all(|digit| digit.is_ascii_hexdigit()) {
                return Err(Error::invalid_glyph(format!("malformed escape {{{}}}", digits)));
            }

            let number = u32::from_str_radix(digits, 16)
                .map_err(|_| Error::invalid_glyph(format!("malformed escape {{{}}}", digits)))?;

            if number > 0xFF {
                return Err(Error::invalid_glyph(format!("escape {{{}}} exceeds one byte", digits)));
            }

            return Ok((number as u8, digits.len() + 2));
        }

        Err(Error::invalid_glyph(match text.chars().next() {
            Some(character) => format!("character {:?} has no charmap entry", character),
            None => "cannot encode an empty glyph".to_owned(),
        }))
    }

    /// Decode an exact byte range into glyphs.
    pub fn decode_all(&self, bytes: &[u8]) -> String {
        let mut text = String::with_capacity(bytes.len());
        for &byte in bytes {
            text.push_str(&self.decode_byte(byte));
        }
        text
    }

    /// Encode a whole string into its glyph bytes.
    pub fn encode_all(&self, text: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(text.len());
        let mut remaining = text;

        while !remaining.is_empty() {
            let (byte, consumed) = self.encode_next(remaining)?;
            bytes.push(byte);
            remaining = &remaining[consumed ..];
        }

        Ok(bytes)
    }
}
