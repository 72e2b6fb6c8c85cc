mod common;

use assert_matches::assert_matches;
use common::*;
use flate2::write::GzEncoder;
use quarry::nbt::{decode, encode};
use quarry::region::{HEADER_SIZE, SECTOR_SIZE};
use quarry::{Compound, Compression, JavaRandom, List, NbtFile, QuarryError, Region, Tag, TagKind};
use std::io::Write;

#[test]
fn test_level_chunk_survives_reencode() {
    let mut region = Region::new();
    region.set(31, 31, Some(level_chunk(5, -3))).unwrap();
    let bytes = region.encode(Compression::Zlib).unwrap();

    let mut reread = Region::from_bytes(bytes).unwrap();
    assert!(reread.exists(31, 31).unwrap());
    reread.load(31, 31).unwrap();
    let level = reread
        .get(31, 31)
        .unwrap()
        .and_then(|root| root.get_compound("Level"))
        .unwrap();
    assert_eq!(level.get("xPos"), Some(&Tag::Int(5)));
    assert_eq!(level.get("zPos"), Some(&Tag::Int(-3)));
    assert_eq!(reread.chunks().collect::<Vec<_>>(), vec![(31, 31)]);
}

#[test]
fn test_raw_chunk_reencode_and_repack() {
    let mut data = blank_region(4);
    put_location(&mut data, 0, 2, 2);
    put_chunk(&mut data, 2, 3, b"012345678");
    assert_eq!(data.len(), 16384);
    let region = Region::from_bytes(data.clone()).unwrap();

    let out = region.encode(Compression::Raw).unwrap();
    assert_eq!(out.len(), HEADER_SIZE + SECTOR_SIZE);
    assert_eq!(locations(&out)[0], (2, 1));
    assert_eq!(&out[8192..8197], &[0, 0, 0, 10, 3]);
    assert_eq!(&out[8197..8206], b"012345678");
    assert!(out[8206..].iter().all(|&b| b == 0));

    assert_eq!(region.repack().unwrap(), data);
}

#[test]
fn test_untouched_region_is_byte_stable() {
    let mut region = Region::new();
    for (x, z) in [(0, 0), (3, 7), (31, 0), (12, 30)] {
        region.set(x, z, Some(level_chunk(x, z))).unwrap();
        region.set_timestamp(x, z, 1_000 + x as i64).unwrap();
    }
    let first = region.encode(Compression::Gzip).unwrap();

    let mut reread = Region::from_bytes(first.clone()).unwrap();
    assert_eq!(reread.encode(Compression::Gzip).unwrap(), first);
    assert_eq!(reread.repack().unwrap(), first);

    // Loading alone is not an edit.
    reread.load_all().unwrap();
    assert_eq!(reread.encode(Compression::Gzip).unwrap(), first);
    assert_eq!(reread.timestamp(3, 7).unwrap(), 1_003);
}

#[test]
fn test_encoded_sectors_are_disjoint() {
    let mut region = Region::new();
    let mut big = level_chunk(0, 0);
    let mut rng = JavaRandom::new(99);
    let mut noise = vec![0i8; 3 * SECTOR_SIZE];
    rng.next_bytes(&mut noise);
    big.insert("Noise", Tag::ByteArray(noise));
    region.set(0, 0, Some(big)).unwrap();
    region.set(1, 0, Some(level_chunk(1, 0))).unwrap();
    region.set(0, 1, Some(level_chunk(0, 1))).unwrap();

    let out = region.encode(Compression::Raw).unwrap();
    let mut ranges: Vec<(usize, usize)> = locations(&out)
        .into_iter()
        .filter(|&(offset, sectors)| offset != 0 || sectors != 0)
        .map(|(offset, sectors)| (offset, offset + sectors))
        .collect();
    ranges.sort();
    assert_eq!(ranges.len(), 3);
    assert!(ranges[0].0 >= 2);
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0);
    }
    assert_eq!(ranges[2].1 * SECTOR_SIZE, out.len());
    assert!(Region::from_bytes(out).is_ok());
}

#[test]
fn test_malformed_regions_are_rejected() {
    let mut data = blank_region(4);
    put_location(&mut data, 0, 2, 2);
    put_location(&mut data, 1, 3, 1);
    put_chunk(&mut data, 2, 3, b"x");
    assert_matches!(
        Region::from_bytes(data),
        Err(QuarryError::OverlappingAllocation { sector: 3, .. })
    );

    let mut data = blank_region(3);
    put_location(&mut data, 9, 0, 3);
    let err = Region::from_bytes(data).unwrap_err();
    assert_matches!(err, QuarryError::MalformedContainer(_));
    assert!(err.is_container_fault());

    let mut data = blank_region(3);
    put_location(&mut data, 0, 2, 1);
    put_chunk(&mut data, 2, 9, b"x");
    assert_matches!(
        Region::from_bytes(data),
        Err(QuarryError::UnknownCompression { id: 9, .. })
    );
}

#[test]
fn test_edit_then_reload() {
    let mut data = blank_region(3);
    put_location(&mut data, 64, 2, 1);
    put_timestamp(&mut data, 64, 1234);
    let payload = Compression::Zlib
        .compress(&NbtFile::new("", level_chunk(0, 2)).to_bytes().unwrap())
        .unwrap();
    put_chunk(&mut data, 2, 2, &payload);

    let mut region = Region::from_bytes(data).unwrap();
    region.load(0, 2).unwrap();
    let mut chunk = region.get(0, 2).unwrap().cloned().unwrap();
    chunk.insert("LastUpdate", Tag::Long(77));
    region.set(0, 2, Some(chunk.clone())).unwrap();
    assert_matches!(region.repack(), Err(QuarryError::PendingEdits { x: 0, z: 2 }));

    let mut reread = Region::from_bytes(region.encode(Compression::Gzip).unwrap()).unwrap();
    reread.load(0, 2).unwrap();
    assert_eq!(reread.get(0, 2).unwrap(), Some(&chunk));
    assert_eq!(reread.timestamp(0, 2).unwrap(), 1234);
}

#[test]
fn test_gzip_document() {
    let mut root = Compound::new();
    root.insert("Data", level_chunk(1, 2));
    root.insert("Players", List::new(TagKind::Compound));
    let raw = NbtFile::new("", root.clone()).to_bytes().unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&raw).unwrap();
    let gzipped = encoder.finish().unwrap();

    let file = NbtFile::from_bytes(&gzipped).unwrap();
    assert_eq!(file.root, root);
    assert_eq!(
        file.root.get("Players").and_then(Tag::as_list).map(List::kind),
        Some(TagKind::Compound)
    );
    assert_eq!(NbtFile::from_bytes(&raw).unwrap(), file);
}

#[test]
fn test_codec_byte_stability() {
    // {"": {"list": [1s, 2s], "name": "abc"}}
    let bytes: Vec<u8> = vec![
        10, 0, 0, //
        9, 0, 4, b'l', b'i', b's', b't', 2, 0, 0, 0, 2, 0, 1, 0, 2, //
        8, 0, 4, b'n', b'a', b'm', b'e', 0, 3, b'a', b'b', b'c', //
        0,
    ];
    let (name, tag, end) = decode(&bytes, 0).unwrap();
    assert_eq!(end, bytes.len());
    assert_eq!(encode(&name, &tag).unwrap(), bytes);

    let compound = tag.as_compound().unwrap();
    assert_eq!(compound.keys().collect::<Vec<_>>(), vec!["list", "name"]);
    assert_eq!(compound.get_str("name"), Some("abc"));
}
