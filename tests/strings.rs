
//! String bank scenarios: sequential decoding, the tab-separated
//! textual forms, and randomized entries across all four variants.

use landstalker_codec::prelude::*;
use landstalker_codec::text::bank;
use rand::prelude::*;
use smallvec::smallvec;


#[test]
fn plain_bank_roundtrip(){
    let strings = vec![
        PlainString::new("NIGEL"),
        PlainString::new("FRIDAY"),
        PlainString::new("MASSAN ELDER"),
    ];

    let encoded = bank::encode_plain_bank(&strings).unwrap();
    assert_eq!(bank::decode_plain_bank(&encoded).unwrap(), strings);
}

#[test]
fn intro_bank_roundtrip(){
    let strings = vec![
        IntroString {
            line1_y: 8, line1_x: 16, line2_y: 0, line2_x: 0,
            display_time: 180,
            line1: "IN THE YEAR 13".to_owned(),
            line2: String::new(),
        },
        IntroString {
            line1_y: 40, line1_x: 8, line2_y: 56, line2_x: 8,
            display_time: 240,
            line1: "A STORY OF GOLD ".to_owned(),
            line2: "AND TREASURE".to_owned(),
        },
    ];

    let encoded = bank::encode_intro_bank(&strings).unwrap();
    assert_eq!(bank::decode_intro_bank(&encoded).unwrap(), strings);
}

#[test]
fn credit_bank_roundtrip(){
    let strings = vec![
        CreditString {
            gfx_params: smallvec![],
            height: 8,
            column: -6,
            text: "PRODUCED BY".to_owned(),
        },
        CreditString {
            gfx_params: smallvec![0x04, 0x10],
            height: 2,
            column: -1,
            text: "(C)1993".to_owned(),
        },
        CreditString::terminator(),
    ];

    let encoded = bank::encode_credit_bank(&strings).unwrap();
    assert_eq!(bank::decode_credit_bank(&encoded).unwrap(), strings);
}

#[test]
fn main_bank_roundtrip(){
    let strings: Vec<MainString> = [
        "Welcome to Massan!",
        "You cannot carry any more.",
        "Nigel looks around...",
    ].iter().map(|&text| MainString::new(text)).collect();

    let forest = MainString::rebuild_forest(&strings).unwrap();
    let encoded = bank::encode_main_bank(&strings, &forest).unwrap();
    assert_eq!(bank::decode_main_bank(&encoded, &forest).unwrap(), strings);
}

#[test]
fn forest_survives_serialisation_between_banks(){
    let strings = vec![
        MainString::new("The door is locked."),
        MainString::new("The door opened!"),
    ];

    let forest = MainString::rebuild_forest(&strings).unwrap();
    let encoded = bank::encode_main_bank(&strings, &forest).unwrap();

    let (offset_table, tree_data) = forest.encode_trees();
    let reloaded = HuffmanForest::build_from(&offset_table, &tree_data, 256).unwrap();

    assert_eq!(bank::decode_main_bank(&encoded, &reloaded).unwrap(), strings);
}


#[test]
fn serialise_forms_are_inverse(){
    let plain = PlainString::new("MIR {40}");
    assert_eq!(PlainString::deserialise(&plain.serialise()).unwrap(), plain);

    let intro = IntroString {
        line1_y: 100, line1_x: 2, line2_y: 0, line2_x: 0,
        display_time: 90,
        line1: "LANDSTALKER".to_owned(),
        line2: String::new(),
    };
    assert_eq!(IntroString::deserialise(&intro.serialise()).unwrap(), intro);

    let credit = CreditString {
        gfx_params: smallvec![1, 2, 3],
        height: 5,
        column: -9,
        text: "SOUND BY".to_owned(),
    };
    assert_eq!(CreditString::deserialise(&credit.serialise()).unwrap(), credit);

    let main = MainString::new("It is dangerous outside.");
    assert_eq!(MainString::deserialise(&main.serialise()).unwrap(), main);
}

#[test]
fn header_rows_describe_the_columns(){
    assert_eq!(<PlainString as GameString>::header_row(), "String");
    assert_eq!(
        <IntroString as GameString>::header_row(),
        "Line1_X\tLine1_Y\tLine2_X\tLine2_Y\tDisplayTime\tLine1\tLine2"
    );
    assert_eq!(
        <CreditString as GameString>::header_row(),
        "Graphics Data\tHeight\tColumn\tString"
    );

    assert_eq!(<MainString as GameString>::encoded_file_extension(), ".huf");
    assert_eq!(<PlainString as GameString>::encoded_file_extension(), ".bin");
}


fn random_credits_text(rng: &mut impl Rng) -> String {
    let length = rng.random_range(1 .. 20);
    let bytes: Vec<u8> = (0 .. length)
        .map(|_| rng.random_range(1 .. 62_u8))
        .collect();

    CREDITS_CHARSET.decode_all(&bytes)
}

#[test]
fn random_credit_entries_roundtrip(){
    let mut rng = rand::rng();

    for _ in 0 .. 50 {
        let parameter_count = rng.random_range(0 .. 6);
        let mut gfx_params = smallvec![];
        for position in 0 .. parameter_count {
            // the first byte may exceed the 0xF0 boundary, later ones must not
            let limit = if position == 0 { 0xFE } else { 0xF0 };
            gfx_params.push(rng.random_range(0 ..= limit));
        }

        // any non-terminator height decodes, including the bytes above
        // 0xF0, except that an entry with parameters needs a height the
        // parameter scan can read past
        let mut height = rng.random_range(-126 ..= 126_i8);
        if height == -1 { height = 0; }
        if parameter_count > 0 && (-15 .. 0).contains(&height) { height = -16; }

        let entry = CreditString {
            gfx_params,
            height,
            column: -rng.random_range(1 .. 16),
            text: random_credits_text(&mut rng),
        };

        let encoded = entry.encode().unwrap();
        let (decoded, consumed) = CreditString::decode(&encoded).unwrap();

        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded, entry);
        assert_eq!(CreditString::deserialise(&decoded.serialise()).unwrap(), decoded);
    }
}

#[test]
fn random_intro_entries_roundtrip(){
    let mut rng = rand::rng();

    for _ in 0 .. 50 {
        let line1_length = rng.random_range(1 ..= 16);
        let line1_bytes: Vec<u8> = (0 .. line1_length)
            .map(|_| rng.random_range(0 .. 30_u8))
            .collect();

        let entry = IntroString {
            line1_y: rng.random(), line1_x: rng.random(),
            line2_y: rng.random(), line2_x: rng.random(),
            display_time: rng.random(),
            line1: INTRO_CHARSET.decode_all(&line1_bytes),
            line2: String::new(),
        };

        let encoded = entry.encode().unwrap();
        let (decoded, consumed) = IntroString::decode(&encoded).unwrap();

        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded, entry);
    }
}
