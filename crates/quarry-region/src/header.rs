//! Location and timestamp tables.

use crate::{CHUNK_COUNT, HEADER_SIZE, SECTOR_SIZE};
use byteorder::{BigEndian, ByteOrder};

/// One location-table entry: first sector and sector count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub offset: u32,
    pub sectors: u8,
}

impl Location {
    /// Largest sector offset a 3-byte entry can address, exclusive.
    pub const MAX_OFFSET: u32 = 1 << 24;

    pub fn is_absent(&self) -> bool {
        self.offset == 0 && self.sectors == 0
    }

    pub fn read(entry: &[u8]) -> Self {
        Location {
            offset: BigEndian::read_u24(entry),
            sectors: entry[3],
        }
    }

    pub fn write(&self, entry: &mut [u8]) {
        BigEndian::write_u24(entry, self.offset);
        entry[3] = self.sectors;
    }
}

/// Parses both tables. `header` must hold at least `HEADER_SIZE` bytes.
pub(crate) fn read_tables(header: &[u8]) -> (Vec<Location>, Vec<i32>) {
    let locations = header[..SECTOR_SIZE]
        .chunks_exact(4)
        .map(Location::read)
        .collect();
    let timestamps = header[SECTOR_SIZE..HEADER_SIZE]
        .chunks_exact(4)
        .map(BigEndian::read_i32)
        .collect();
    (locations, timestamps)
}

/// Builds an 8 KiB header from per-slot locations and timestamps.
pub(crate) fn write_tables(locations: &[Location], timestamps: &[i32]) -> Vec<u8> {
    debug_assert_eq!(locations.len(), CHUNK_COUNT);
    debug_assert_eq!(timestamps.len(), CHUNK_COUNT);
    let mut header = vec![0u8; HEADER_SIZE];
    let (location_table, timestamp_table) = header.split_at_mut(SECTOR_SIZE);
    for (entry, location) in location_table.chunks_exact_mut(4).zip(locations) {
        location.write(entry);
    }
    for (entry, &timestamp) in timestamp_table.chunks_exact_mut(4).zip(timestamps) {
        BigEndian::write_i32(entry, timestamp);
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_layout() {
        let mut entry = [0u8; 4];
        Location {
            offset: 0x01_02_03,
            sectors: 7,
        }
        .write(&mut entry);
        assert_eq!(entry, [1, 2, 3, 7]);
        assert_eq!(Location::read(&entry).offset, 0x01_02_03);
    }

    #[test]
    fn test_tables() {
        let mut locations = vec![Location::default(); CHUNK_COUNT];
        let mut timestamps = vec![0; CHUNK_COUNT];
        locations[1] = Location {
            offset: 2,
            sectors: 1,
        };
        timestamps[1] = -5;
        timestamps[1023] = 1_700_000_000;

        let header = write_tables(&locations, &timestamps);
        assert_eq!(header.len(), HEADER_SIZE);
        assert_eq!(&header[4..8], &[0, 0, 2, 1]);
        assert_eq!(&header[4100..4104], &(-5i32).to_be_bytes());

        let (read_locations, read_timestamps) = read_tables(&header);
        assert_eq!(read_locations, locations);
        assert_eq!(read_timestamps, timestamps);
        assert!(read_locations[0].is_absent());
    }
}
