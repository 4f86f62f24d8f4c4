
//! Length-prefixed plain strings, used for character and item names.

use crate::compression::ByteVec;
use crate::error::{Error, Result};
use crate::io::{take_1, take_n};
use super::charmap::Charmap;
use super::charset::MAIN_CHARSET;
use super::GameString;


/// A plain string: one length byte, then that many charset bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlainString {
    pub text: String,
}

impl PlainString {

    pub fn new(text: impl Into<String>) -> Self {
        PlainString { text: text.into() }
    }

    /// Decode one entry, returning it and the bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut remaining = bytes;
        let length = usize::from(take_1(&mut remaining)?);
        let body = take_n(&mut remaining, length)?;

        Ok((PlainString { text: MAIN_CHARSET.decode_all(body) }, length + 1))
    }

    /// Encode the entry. Fails with [`Error::Overflow`] if the encoded
    /// body exceeds 255 bytes.
    pub fn encode(&self) -> Result<ByteVec> {
        let body = MAIN_CHARSET.encode_all(&self.text)?;
        if body.len() > 0xFF {
            return Err(Error::overlong(format!(
                "string encodes to {} bytes, the length prefix holds 255", body.len()
            )));
        }

        let mut bytes = Vec::with_capacity(body.len() + 1);
        bytes.push(body.len() as u8);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    pub fn serialise(&self) -> String {
        self.text.clone()
    }

    pub fn deserialise(line: &str) -> Result<Self> {
        Ok(PlainString { text: line.to_owned() })
    }
}

impl GameString for PlainString {
    fn charmap(&self) -> &'static Charmap { &MAIN_CHARSET }
    fn text(&self) -> &str { &self.text }
    fn header_row() -> &'static str { "String" }
    fn encoded_file_extension() -> &'static str { ".bin" }
}
