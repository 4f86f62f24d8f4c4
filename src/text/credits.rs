
//! End-credit strings: a graphics-parameter prefix, a layout byte pair,
//! and an optional scrolling text payload.

use smallvec::SmallVec;

use crate::compression::ByteVec;
use crate::error::{Error, Result};
use crate::io::{take_1, peek};
use super::charmap::Charmap;
use super::charset::CREDITS_CHARSET;
use super::GameString;


const TEXT_TERMINATOR: u8 = 0x00;

/// Graphics parameter bytes stay at or below this value; the column
/// byte of a text entry is always above it, which is what delimits the
/// variable-length prefix.
const MAX_GFX_PARAM: u8 = 0xF0;

/// A height byte of `-1` marks the bank terminator entry.
const ENTRY_TERMINATOR: i8 = -1;


/// One end-credit entry.
///
/// A height of `-1` marks the entry ending the bank; it carries no
/// text. Any other entry places `text` at the given column, with the
/// column byte stored negated on disk (and re-negated in the
/// tab-separated form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditString {
    pub gfx_params: SmallVec<[u8; 8]>,
    pub height: i8,
    pub column: i8,
    pub text: String,
}

impl CreditString {

    /// The bank terminator entry.
    pub fn terminator() -> Self {
        CreditString {
            gfx_params: SmallVec::new(),
            height: ENTRY_TERMINATOR,
            column: 0,
            text: String::new(),
        }
    }

    pub fn is_terminator(&self) -> bool {
        self.height == ENTRY_TERMINATOR
    }

    /// Decode one entry, returning it and the bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut remaining = bytes;
        let mut gfx_params = SmallVec::new();

        // a terminator entry has no prefix, so the height byte itself
        // is what stops the parameter scan
        if peek(remaining, 0)? != ENTRY_TERMINATOR as u8 {
            while peek(remaining, 1)? <= MAX_GFX_PARAM {
                gfx_params.push(take_1(&mut remaining)?);
            }
        }

        let height = take_1(&mut remaining)? as i8;
        let column = take_1(&mut remaining)? as i8;
        let mut consumed = gfx_params.len() + 2;

        let mut text = String::new();
        if height != ENTRY_TERMINATOR {
            loop {
                let byte = take_1(&mut remaining)?;
                consumed += 1;
                if byte == TEXT_TERMINATOR { break; }
                text.push_str(&CREDITS_CHARSET.decode_byte(byte));
            }
        }

        Ok((CreditString { gfx_params, height, column, text }, consumed))
    }

    /// Encode the entry, checking the byte-range rules the
    /// data-dependent prefix scan relies on.
    pub fn encode(&self) -> Result<ByteVec> {
        let mut bytes = Vec::with_capacity(self.gfx_params.len() + 2 + self.text.len());

        if self.is_terminator() {
            if !self.gfx_params.is_empty() {
                return Err(Error::invalid("a terminator entry cannot carry graphics parameters"));
            }

            bytes.push(self.height as u8);
            bytes.push(self.column as u8);
            return Ok(bytes);
        }

        if let Some(&param) = self.gfx_params.iter().skip(1).find(|&&param| param > MAX_GFX_PARAM) {
            return Err(Error::invalid(format!(
                "graphics parameter {:#04x} would end the parameter scan early", param
            )));
        }
        if self.gfx_params.first() == Some(&(ENTRY_TERMINATOR as u8)) {
            return Err(Error::invalid("a leading 0xFF graphics parameter mimics a terminator entry"));
        }
        // with no parameters the scan starts at the column byte and
        // never examines the height, so any non-terminator value works
        if !self.gfx_params.is_empty() && self.height as u8 > MAX_GFX_PARAM {
            return Err(Error::invalid(format!(
                "height {} would end the parameter scan early", self.height
            )));
        }
        if self.column as u8 <= MAX_GFX_PARAM {
            return Err(Error::invalid(format!(
                "column {} would be consumed as a graphics parameter", self.column
            )));
        }

        bytes.extend_from_slice(&self.gfx_params);
        bytes.push(self.height as u8);
        bytes.push(self.column as u8);

        let body = CREDITS_CHARSET.encode_all(&self.text)?;
        if body.contains(&TEXT_TERMINATOR) {
            return Err(Error::invalid("credit text contains the terminator byte"));
        }

        bytes.extend_from_slice(&body);
        bytes.push(TEXT_TERMINATOR);
        Ok(bytes)
    }

    pub fn serialise(&self) -> String {
        let params = self.gfx_params.iter()
            .map(|param| param.to_string())
            .collect::<Vec<String>>()
            .join(",");

        // the column is negated in the textual form
        format!("{}\t{}\t{}\t{}", params, self.height, -i32::from(self.column), self.text)
    }

    pub fn deserialise(line: &str) -> Result<Self> {
        let mut cells = line.split('\t');

        let params = cells.next().unwrap_or("");
        let mut gfx_params = SmallVec::new();
        if !params.is_empty() {
            for cell in params.split(',') {
                gfx_params.push(cell.parse()
                    .map_err(|_| Error::invalid(format!("malformed graphics parameter {:?}", cell)))?);
            }
        }

        let mut number = || -> Result<i32> {
            let cell = cells.next().unwrap_or("");
            cell.parse().map_err(|_| Error::invalid(format!("malformed number {:?}", cell)))
        };

        let height = number()? as i8;
        let column = (-number()?) as i8;
        let text = cells.next().unwrap_or("").to_owned();

        Ok(CreditString { gfx_params, height, column, text })
    }
}

impl GameString for CreditString {
    fn charmap(&self) -> &'static Charmap { &CREDITS_CHARSET }
    fn text(&self) -> &str { &self.text }
    fn header_row() -> &'static str { "Graphics Data\tHeight\tColumn\tString" }
    fn encoded_file_extension() -> &'static str { ".bin" }
}
