//! Anvil region container (.mca).
//!
//! A region file holds up to 32x32 chunks:
//! - Bytes 0-4095: location table (1024 entries of `offset:u24, sectors:u8`)
//! - Bytes 4096-8191: timestamp table (1024 entries of `i32`)
//! - Bytes 8192+: chunk data, each `[length:i32][compression:u8][payload]` padded to whole sectors

mod compression;
mod header;
mod region;
mod sectors;

pub use compression::Compression;
pub use header::Location;
pub use region::Region;

use quarry_common::{QuarryError, Result};

/// Size of one sector in bytes.
pub const SECTOR_SIZE: usize = 4096;

/// Location table plus timestamp table.
pub const HEADER_SIZE: usize = SECTOR_SIZE * 2;

/// Chunks per region edge.
pub const REGION_SIZE: i32 = 32;

pub const CHUNK_COUNT: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Row-major slot index for region-local coordinates.
pub fn chunk_index(x: i32, z: i32) -> Result<usize> {
    if !(0..REGION_SIZE).contains(&x) || !(0..REGION_SIZE).contains(&z) {
        return Err(QuarryError::InvalidCoordinate { x, z });
    }
    Ok((z * REGION_SIZE + x) as usize)
}

#[inline]
pub fn index_to_local(index: usize) -> (i32, i32) {
    let x = (index % REGION_SIZE as usize) as i32;
    let z = (index / REGION_SIZE as usize) as i32;
    (x, z)
}
