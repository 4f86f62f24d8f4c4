
//! Main script strings, compressed through the per-prefix Huffman forest.

use crate::compression::{ByteVec, HuffmanForest, FrequencyCounts};
use crate::compression::huffman::STRING_TERMINATOR;
use crate::error::{Error, Result, UnitResult};
use crate::io::peek;
use super::charmap::Charmap;
use super::charset::MAIN_CHARSET;
use super::GameString;


/// One main script string. On disk: a length byte counting itself plus
/// the compressed payload, then the Huffman bit stream of the glyph
/// bytes ending in the `0x55` terminator symbol.
///
/// The forest is borrowed per call; it is read-only during both
/// directions, so one forest serves any number of strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MainString {
    pub text: String,
}

impl MainString {

    pub fn new(text: impl Into<String>) -> Self {
        MainString { text: text.into() }
    }

    /// Decode one entry, returning it and the bytes consumed.
    pub fn decode(bytes: &[u8], forest: &HuffmanForest) -> Result<(Self, usize)> {
        let total = usize::from(peek(bytes, 0)?);
        if total == 0 {
            return Err(Error::corrupt("string length byte cannot be zero"));
        }
        if bytes.len() < total {
            return Err(Error::truncated(format!(
                "string claims {} bytes, buffer holds {}", total, bytes.len()
            )));
        }

        let symbols = forest.decompress_bytes(&bytes[1 .. total])?;
        let text = MAIN_CHARSET.decode_all(&symbols[.. symbols.len() - 1]);

        Ok((MainString { text }, total))
    }

    /// Encode and compress the entry.
    pub fn encode(&self, forest: &HuffmanForest) -> Result<ByteVec> {
        let compressed = forest.compress_bytes(&self.symbols()?)?;
        if compressed.len() + 1 > 0xFF {
            return Err(Error::overlong(format!(
                "string compresses to {} bytes, the length prefix holds 254", compressed.len()
            )));
        }

        let mut bytes = Vec::with_capacity(compressed.len() + 1);
        bytes.push((compressed.len() + 1) as u8);
        bytes.extend_from_slice(&compressed);
        Ok(bytes)
    }

    /// Accumulate this string's symbol pair frequencies, the input to
    /// [`HuffmanForest::recalculate`]. The context starts at zero and
    /// the terminator symbol is counted.
    pub fn add_frequency_counts(&self, frequencies: &mut FrequencyCounts) -> UnitResult {
        let mut context = 0_u8;
        for symbol in self.symbols()? {
            *frequencies.entry(context).or_default().entry(symbol).or_insert(0) += 1;
            context = symbol;
        }

        Ok(())
    }

    /// Build a forest fitting the given corpus.
    pub fn rebuild_forest(corpus: &[MainString]) -> Result<HuffmanForest> {
        let mut frequencies = FrequencyCounts::new();
        for string in corpus {
            string.add_frequency_counts(&mut frequencies)?;
        }

        HuffmanForest::recalculate(&frequencies)
    }

    /// The terminated glyph byte form fed to the forest.
    fn symbols(&self) -> Result<ByteVec> {
        let mut symbols = MAIN_CHARSET.encode_all(&self.text)?;
        if symbols.contains(&STRING_TERMINATOR) {
            return Err(Error::invalid("string contains the terminator symbol"));
        }

        symbols.push(STRING_TERMINATOR);
        Ok(symbols)
    }

    pub fn serialise(&self) -> String {
        self.text.clone()
    }

    pub fn deserialise(line: &str) -> Result<Self> {
        Ok(MainString { text: line.to_owned() })
    }
}

impl GameString for MainString {
    fn charmap(&self) -> &'static Charmap { &MAIN_CHARSET }
    fn text(&self) -> &str { &self.text }
    fn header_row() -> &'static str { "String" }
    fn encoded_file_extension() -> &'static str { ".huf" }
}
