
//! End-to-end scenarios over the public interface,
//! plus randomized round-trips across all codecs.

use landstalker_codec::prelude::*;
use rand::prelude::*;


#[test]
fn plain_string_hello(){
    let string = PlainString::new("HELLO");

    let encoded = string.encode().unwrap();
    assert_eq!(encoded, vec![0x05, 0x12, 0x0F, 0x16, 0x16, 0x19]);

    let (decoded, consumed) = PlainString::decode(&encoded).unwrap();
    assert_eq!(consumed, 6);
    assert_eq!(decoded, string);
}

#[test]
fn intro_string_positioned(){
    let string = IntroString {
        line1_y: 8, line1_x: 16, line2_y: 24, line2_x: 32,
        display_time: 120,
        line1: "HI".to_owned(),
        line2: String::new(),
    };

    let encoded = string.encode().unwrap();
    assert_eq!(encoded, vec![
        0x00, 0x08, 0x00, 0x10, 0x00, 0x18, 0x00, 0x20, 0x00, 0x78,
        0x08, 0x09, 0xFF,
    ]);

    let (decoded, _) = IntroString::decode(&encoded).unwrap();
    assert_eq!(decoded, string);
}

#[test]
fn end_credit_terminator(){
    let entry = CreditString::terminator();

    let encoded = entry.encode().unwrap();
    assert_eq!(encoded, vec![0xFF, 0x00]);

    let (decoded, consumed) = CreditString::decode(&encoded).unwrap();
    assert_eq!(consumed, 2);
    assert_eq!(decoded, entry);
}

#[test]
fn uniform_2x2_tilemap(){
    let tiles = vec![Tile::from_value(0x1234); 4];
    let map = Tilemap2D::from_tiles(2, 2, tiles).unwrap();

    let compressed = map.compress().unwrap();
    assert_eq!(&compressed[.. 2], &[0x02, 0x02]);

    let decompressed = Tilemap2D::decompress(&compressed).unwrap();
    assert_eq!(decompressed, map);
    assert_eq!(decompressed.compress().unwrap(), compressed);
}

#[test]
fn trivial_room(){
    let room = RoomTilemap::new(0, 0, 1, 1, 1, 1);

    let compressed = room.compress().unwrap();
    assert_eq!(&compressed[.. 4], &[0x00, 0x00, 0x00, 0x01]);

    // the 3D stream is search-dependent, so the contract is semantic
    // equality rather than byte-identical re-compression
    let decompressed = RoomTilemap::decompress(&compressed).unwrap();
    assert_eq!(decompressed, room);
}

#[test]
fn huffman_forest_rebuild_idempotence(){
    let corpus = vec![
        MainString::new("The King of Mercator welcomes you."),
        MainString::new("Welcome to the town of Gumi."),
        MainString::new("You got 120 gold!"),
    ];

    let forest = MainString::rebuild_forest(&corpus).unwrap();

    for string in &corpus {
        let encoded = string.encode(&forest).unwrap();
        let (decoded, consumed) = MainString::decode(&encoded, &forest).unwrap();

        assert_eq!(consumed, encoded.len());
        assert_eq!(&decoded, string);
    }
}

#[test]
fn rebuilt_forest_survives_its_packed_form(){
    let corpus = vec![
        MainString::new("Massan is a small village."),
        MainString::new("Massan lies east of Gumi."),
    ];

    let forest = MainString::rebuild_forest(&corpus).unwrap();
    let (offset_table, tree_data) = forest.encode_trees();
    let rebuilt = HuffmanForest::build_from(&offset_table, &tree_data, 256).unwrap();

    for string in &corpus {
        let encoded = string.encode(&rebuilt).unwrap();
        assert_eq!(MainString::decode(&encoded, &rebuilt).unwrap().0, *string);
    }
}


fn random_tilemap(rng: &mut impl Rng, width: u8, height: u8) -> Tilemap2D {
    let cells = usize::from(width) * usize::from(height);

    // biased towards runs and ramps so every command class appears
    let mut tiles = Vec::with_capacity(cells);
    let mut value: u16 = rng.random_range(0 .. 0x7FF);

    while tiles.len() < cells {
        match rng.random_range(0 .. 4) {
            0 => value = rng.random_range(0 .. 0x7FF),
            1 => value = (value + 1) % 0x7FF,
            _ => {}
        }

        let attributes = u16::from(rng.random_range(0 .. 4_u8)) << 13;
        let run = rng.random_range(1 .. 10).min(cells - tiles.len());
        for _ in 0 .. run {
            tiles.push(Tile::from_value(attributes | value));
        }
    }

    Tilemap2D::from_tiles(width, height, tiles).unwrap()
}

#[test]
fn random_tilemaps_roundtrip(){
    let mut rng = rand::rng();

    for _ in 0 .. 50 {
        let width = rng.random_range(1 .. 32);
        let height = rng.random_range(1 .. 32);
        let map = random_tilemap(&mut rng, width, height);

        let compressed = map.compress().unwrap();
        let decompressed = Tilemap2D::decompress(&compressed).unwrap();

        assert_eq!(decompressed, map);
        assert_eq!(decompressed.compress().unwrap(), compressed);
    }
}

#[test]
fn random_rooms_roundtrip(){
    let mut rng = rand::rng();

    for _ in 0 .. 30 {
        let width = rng.random_range(1 .. 20);
        let height = rng.random_range(1 .. 16);
        let mut room = RoomTilemap::new(
            rng.random(), rng.random(),
            width, height,
            rng.random_range(1 .. 12), rng.random_range(1 .. 12),
        );

        // rooms mix flat regions, ramps and noise
        for cell in room.foreground.iter_mut().chain(&mut room.background) {
            *cell = match rng.random_range(0 .. 3) {
                0 => 0x040,
                1 => rng.random_range(0 .. 8),
                _ => rng.random_range(0 .. 0x400),
            };
        }
        for cell in room.heightmap.iter_mut() {
            *cell = rng.random_range(0 .. 3) * 0x1011;
        }

        let decompressed = RoomTilemap::decompress(&room.compress().unwrap()).unwrap();
        assert_eq!(decompressed, room);
    }
}

#[test]
fn random_plain_strings_roundtrip(){
    let mut rng = rand::rng();

    for _ in 0 .. 100 {
        let length = rng.random_range(0 .. 60);
        let bytes: Vec<u8> = (0 .. length).map(|_| rng.random_range(0 .. 90)).collect();

        let text = MAIN_CHARSET.decode_all(&bytes);
        let string = PlainString::new(text);

        let (decoded, _) = PlainString::decode(&string.encode().unwrap()).unwrap();
        assert_eq!(decoded, string);
        assert_eq!(PlainString::deserialise(&decoded.serialise()).unwrap(), decoded);
    }
}

#[test]
fn random_corpus_forest_roundtrip(){
    let mut rng = rand::rng();

    let corpus: Vec<MainString> = (0 .. 40).map(|_| {
        let length = rng.random_range(0 .. 40);
        // stay below the terminator, well within the 7-bit Huffman alphabet
        let bytes: Vec<u8> = (0 .. length)
            .map(|_| rng.random_range(0 .. 0x55_u8))
            .collect();

        MainString::new(MAIN_CHARSET.decode_all(&bytes))
    }).collect();

    let forest = MainString::rebuild_forest(&corpus).unwrap();

    for string in &corpus {
        let encoded = string.encode(&forest).unwrap();
        assert_eq!(MainString::decode(&encoded, &forest).unwrap().0, *string);
    }
}

#[test]
fn lz77_tilemap_mode_roundtrip(){
    let mut rng = rand::rng();

    for _ in 0 .. 20 {
        let width = rng.random_range(1 .. 24);
        let height = rng.random_range(1 .. 24);
        let map = random_tilemap(&mut rng, width, height);

        let restored = Tilemap2D::from_lz77(&map.to_lz77(), width).unwrap();
        assert_eq!(restored, map);
    }
}
