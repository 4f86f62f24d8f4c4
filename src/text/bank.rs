
//! Whole-bank parsing and encoding.
//!
//! The game stores each string table as one contiguous bank of
//! back-to-back entries. Decoding walks the buffer entry by entry until
//! it is exhausted; encoding concatenates the entries back. Splitting a
//! bank across output files is a tooling concern and stays outside the
//! codec core.

use crate::compression::{ByteVec, HuffmanForest};
use crate::error::Result;
use super::{PlainString, IntroString, CreditString, MainString};


pub fn decode_plain_bank(bytes: &[u8]) -> Result<Vec<PlainString>> {
    decode_bank(bytes, PlainString::decode)
}

pub fn encode_plain_bank(strings: &[PlainString]) -> Result<ByteVec> {
    encode_bank(strings, PlainString::encode)
}

pub fn decode_intro_bank(bytes: &[u8]) -> Result<Vec<IntroString>> {
    decode_bank(bytes, IntroString::decode)
}

pub fn encode_intro_bank(strings: &[IntroString]) -> Result<ByteVec> {
    encode_bank(strings, IntroString::encode)
}

pub fn decode_credit_bank(bytes: &[u8]) -> Result<Vec<CreditString>> {
    decode_bank(bytes, CreditString::decode)
}

pub fn encode_credit_bank(strings: &[CreditString]) -> Result<ByteVec> {
    encode_bank(strings, CreditString::encode)
}

pub fn decode_main_bank(bytes: &[u8], forest: &HuffmanForest) -> Result<Vec<MainString>> {
    decode_bank(bytes, |remaining| MainString::decode(remaining, forest))
}

pub fn encode_main_bank(strings: &[MainString], forest: &HuffmanForest) -> Result<ByteVec> {
    encode_bank(strings, |string| string.encode(forest))
}


fn decode_bank<T>(
    bytes: &[u8],
    decode: impl Fn(&[u8]) -> Result<(T, usize)>,
) -> Result<Vec<T>>
{
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let (entry, consumed) = decode(&bytes[offset ..])?;
        entries.push(entry);
        offset += consumed;
    }

    Ok(entries)
}

fn encode_bank<T>(
    entries: &[T],
    encode: impl Fn(&T) -> Result<ByteVec>,
) -> Result<ByteVec>
{
    let mut bytes = Vec::new();
    for entry in entries {
        bytes.extend(encode(entry)?);
    }

    Ok(bytes)
}


#[cfg(test)]
mod test {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn plain_bank(){
        let strings = vec![
            PlainString::new("NIGEL"),
            PlainString::new(""),
            PlainString::new("FRIDAY"),
        ];

        let bank = encode_plain_bank(&strings).unwrap();
        assert_eq!(decode_plain_bank(&bank).unwrap(), strings);
    }

    #[test]
    fn credit_bank_ends_with_terminator(){
        let strings = vec![
            CreditString {
                gfx_params: smallvec![8],
                height: 2,
                column: -4,
                text: "STAFF".to_owned(),
            },
            CreditString::terminator(),
        ];

        let bank = encode_credit_bank(&strings).unwrap();
        assert_eq!(decode_credit_bank(&bank).unwrap(), strings);
    }

    #[test]
    fn main_bank_shares_one_forest(){
        let strings = vec![
            MainString::new("No way!"),
            MainString::new("Way."),
        ];

        let forest = MainString::rebuild_forest(&strings).unwrap();
        let bank = encode_main_bank(&strings, &forest).unwrap();
        assert_eq!(decode_main_bank(&bank, &forest).unwrap(), strings);
    }

    #[test]
    fn bad_entry_fails_the_bank(){
        // second entry runs past the end of the buffer
        let bank = [0x01, 0x0B, 0x05, 0x0B];
        assert!(decode_plain_bank(&bank).is_err());
    }
}
