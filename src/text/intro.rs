
//! Intro screen strings: two positioned lines with a display time.

use crate::compression::ByteVec;
use crate::error::{Error, Result};
use crate::io::{peek, take_u16_be, put_u16_be};
use super::charmap::Charmap;
use super::charset::INTRO_CHARSET;
use super::GameString;


const LINE_TERMINATOR: u8 = 0xFF;
const LINE_LENGTH: usize = 16;
const SPACE: u8 = 0x00;


/// One intro screen entry: five big-endian positioning words, then a
/// payload of up to 16 glyphs per line terminated by `0xFF`. The first
/// 16 payload bytes belong to line 1, the rest to line 2.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntroString {
    pub line1_y: u16,
    pub line1_x: u16,
    pub line2_y: u16,
    pub line2_x: u16,
    pub display_time: u16,
    pub line1: String,
    pub line2: String,
}

impl IntroString {

    /// Decode one entry, returning it and the bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut remaining = bytes;

        let line1_y = take_u16_be(&mut remaining)?;
        let line1_x = take_u16_be(&mut remaining)?;
        let line2_y = take_u16_be(&mut remaining)?;
        let line2_x = take_u16_be(&mut remaining)?;
        let display_time = take_u16_be(&mut remaining)?;

        let mut line1 = String::new();
        let mut line2 = String::new();
        let mut position = 0;

        while peek(remaining, position)? != LINE_TERMINATOR {
            let glyph = INTRO_CHARSET.decode_byte(remaining[position]);

            if position < LINE_LENGTH { line1.push_str(&glyph); }
            else { line2.push_str(&glyph); }

            position += 1;
        }

        Ok((
            IntroString { line1_y, line1_x, line2_y, line2_x, display_time, line1, line2 },
            10 + position + 1,
        ))
    }

    /// Encode the entry. Line 1 is padded to 16 glyphs with spaces
    /// when line 2 is present.
    pub fn encode(&self) -> Result<ByteVec> {
        let mut bytes = Vec::with_capacity(10 + LINE_LENGTH * 2 + 1);
        put_u16_be(&mut bytes, self.line1_y);
        put_u16_be(&mut bytes, self.line1_x);
        put_u16_be(&mut bytes, self.line2_y);
        put_u16_be(&mut bytes, self.line2_x);
        put_u16_be(&mut bytes, self.display_time);

        let line1 = INTRO_CHARSET.encode_all(&self.line1)?;
        let line2 = INTRO_CHARSET.encode_all(&self.line2)?;
        Self::check_line(&line1)?;
        Self::check_line(&line2)?;

        bytes.extend_from_slice(&line1);
        if !line2.is_empty() {
            bytes.resize(10 + LINE_LENGTH, SPACE);
            bytes.extend_from_slice(&line2);
        }

        bytes.push(LINE_TERMINATOR);
        Ok(bytes)
    }

    fn check_line(line: &[u8]) -> Result<()> {
        if line.len() > LINE_LENGTH {
            return Err(Error::overlong(format!(
                "intro line encodes to {} bytes, the screen fits {}", line.len(), LINE_LENGTH
            )));
        }

        if line.contains(&LINE_TERMINATOR) {
            return Err(Error::invalid("intro line contains the terminator byte"));
        }

        Ok(())
    }

    pub fn serialise(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.line1_x, self.line1_y, self.line2_x, self.line2_y,
            self.display_time, self.line1, self.line2,
        )
    }

    pub fn deserialise(line: &str) -> Result<Self> {
        let mut cells = line.split('\t');
        let mut number = || -> Result<u16> {
            let cell = cells.next().unwrap_or("");
            cell.parse().map_err(|_| Error::invalid(format!("malformed number {:?}", cell)))
        };

        let line1_x = number()?;
        let line1_y = number()?;
        let line2_x = number()?;
        let line2_y = number()?;
        let display_time = number()?;

        let line1 = cells.next().unwrap_or("").to_owned();
        let line2 = cells.next().unwrap_or("").to_owned();

        Ok(IntroString { line1_y, line1_x, line2_y, line2_x, display_time, line1, line2 })
    }
}

impl GameString for IntroString {
    fn charmap(&self) -> &'static Charmap { &INTRO_CHARSET }
    fn text(&self) -> &str { &self.line1 }
    fn header_row() -> &'static str { "Line1_X\tLine1_Y\tLine2_X\tLine2_Y\tDisplayTime\tLine1\tLine2" }
    fn encoded_file_extension() -> &'static str { ".bin" }
}
