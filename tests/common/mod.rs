use byteorder::{BigEndian, ByteOrder};
use quarry::region::SECTOR_SIZE;
use quarry::{Compound, Tag};

pub fn blank_region(sectors: usize) -> Vec<u8> {
    vec![0u8; sectors * SECTOR_SIZE]
}

pub fn put_location(data: &mut [u8], index: usize, offset: u32, sectors: u8) {
    BigEndian::write_u24(&mut data[index * 4..index * 4 + 3], offset);
    data[index * 4 + 3] = sectors;
}

pub fn put_timestamp(data: &mut [u8], index: usize, timestamp: i32) {
    let at = SECTOR_SIZE + index * 4;
    BigEndian::write_i32(&mut data[at..at + 4], timestamp);
}

/// Writes `[length][id][payload]` at the start of `sector`.
pub fn put_chunk(data: &mut [u8], sector: usize, id: u8, payload: &[u8]) {
    let start = sector * SECTOR_SIZE;
    BigEndian::write_i32(&mut data[start..start + 4], payload.len() as i32 + 1);
    data[start + 4] = id;
    data[start + 5..start + 5 + payload.len()].copy_from_slice(payload);
}

/// Location table entries of a region file as `(offset, sectors)`.
pub fn locations(data: &[u8]) -> Vec<(usize, usize)> {
    data[..SECTOR_SIZE]
        .chunks_exact(4)
        .map(|entry| (BigEndian::read_u24(entry) as usize, entry[3] as usize))
        .collect()
}

pub fn level_chunk(x: i32, z: i32) -> Compound {
    let mut level = Compound::new();
    level.insert("xPos", Tag::Int(x));
    level.insert("zPos", Tag::Int(z));
    let mut root = Compound::new();
    root.insert("Level", level);
    root
}
