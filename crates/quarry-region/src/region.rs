use crate::compression::Compression;
use crate::header::{read_tables, write_tables, Location};
use crate::sectors::SectorMap;
use crate::{chunk_index, index_to_local, CHUNK_COUNT, HEADER_SIZE, SECTOR_SIZE};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use log::{debug, trace};
use quarry_common::{QuarryError, Result};
use quarry_nbt::{Compound, NbtFile};
use std::borrow::Cow;
use std::fs;
use std::ops::Range;
use std::path::Path;

/// A chunk body as found in the source buffer.
#[derive(Debug, Clone)]
struct Stored {
    compression: Compression,
    /// Byte range of the compressed payload.
    payload: Range<usize>,
    /// Sector range allocated to the chunk.
    sectors: Range<usize>,
}

#[derive(Debug, Clone, Default)]
enum SlotState {
    #[default]
    Empty,
    Stored(Stored),
    Decoded(NbtFile),
    Both(Stored, NbtFile),
}

impl SlotState {
    fn stored(&self) -> Option<&Stored> {
        match self {
            SlotState::Stored(stored) | SlotState::Both(stored, _) => Some(stored),
            _ => None,
        }
    }

    fn decoded(&self) -> Option<&NbtFile> {
        match self {
            SlotState::Decoded(file) | SlotState::Both(_, file) => Some(file),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    state: SlotState,
    timestamp: i32,
    /// The output must be re-derived from the decoded tag (or the chunk dropped).
    dirty: bool,
}

/// An in-memory region file: 32x32 chunk slots over the buffer they were read from.
///
/// Chunk bodies stay compressed until [`Region::load`] is called for them. Output is
/// produced either by [`Region::encode`], which re-encodes edited chunks, or by
/// [`Region::repack`], which copies untouched sectors into a gap-free layout.
#[derive(Debug, Clone)]
pub struct Region {
    data: Vec<u8>,
    slots: Vec<Slot>,
}

impl Default for Region {
    fn default() -> Self {
        Region::new()
    }
}

impl Region {
    /// A region with every slot empty.
    pub fn new() -> Self {
        Region {
            data: Vec::new(),
            slots: vec![Slot::default(); CHUNK_COUNT],
        }
    }

    /// Parses the header and validates the sector layout. No chunk is decoded.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < HEADER_SIZE || data.len() % SECTOR_SIZE != 0 {
            return Err(QuarryError::MalformedContainer(format!(
                "region file is {} bytes, expected a multiple of {} and at least {}",
                data.len(),
                SECTOR_SIZE,
                HEADER_SIZE
            )));
        }
        let sector_count = data.len() / SECTOR_SIZE;
        let (locations, timestamps) = read_tables(&data[..HEADER_SIZE]);
        let mut sector_map = SectorMap::new(sector_count);
        let mut slots = Vec::with_capacity(CHUNK_COUNT);
        for (index, (location, timestamp)) in locations.into_iter().zip(timestamps).enumerate() {
            let state = if location.is_absent() {
                SlotState::Empty
            } else {
                SlotState::Stored(parse_chunk(&data, index, location, &mut sector_map)?)
            };
            slots.push(Slot {
                state,
                timestamp,
                dirty: false,
            });
        }

        let region = Region { data, slots };
        debug!(
            "Parsed region: {} chunks in {} sectors",
            region.chunks().count(),
            sector_count
        );
        Ok(region)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(fs::read(path)?)
    }

    pub fn exists(&self, x: i32, z: i32) -> Result<bool> {
        Ok(!matches!(self.slot(x, z)?.state, SlotState::Empty))
    }

    pub fn is_dirty(&self, x: i32, z: i32) -> Result<bool> {
        Ok(self.slot(x, z)?.dirty)
    }

    /// Coordinates of every present chunk, in slot order.
    pub fn chunks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !matches!(slot.state, SlotState::Empty))
            .map(|(index, _)| index_to_local(index))
    }

    /// Decompresses and decodes a stored chunk. Absent and already decoded chunks are left alone.
    pub fn load(&mut self, x: i32, z: i32) -> Result<()> {
        let index = chunk_index(x, z)?;
        let slot = &mut self.slots[index];
        if let SlotState::Stored(stored) = &slot.state {
            let stored = stored.clone();
            let raw = stored
                .compression
                .decompress(&self.data[stored.payload.clone()])?;
            let file = NbtFile::read(&mut raw.as_slice())?;
            trace!(
                "Loaded chunk ({},{}): {} bytes {}, {} entries",
                x,
                z,
                raw.len(),
                stored.compression,
                file.root.len()
            );
            slot.state = SlotState::Both(stored, file);
        }
        Ok(())
    }

    pub fn load_all(&mut self) -> Result<()> {
        for index in 0..CHUNK_COUNT {
            let (x, z) = index_to_local(index);
            self.load(x, z)?;
        }
        Ok(())
    }

    pub fn get(&self, x: i32, z: i32) -> Result<Option<&Compound>> {
        Ok(self.slot(x, z)?.state.decoded().map(|file| &file.root))
    }

    /// Replaces the chunk (or removes it with `None`) and marks the slot dirty.
    ///
    /// A replaced chunk keeps the root name it was decoded with.
    pub fn set(&mut self, x: i32, z: i32, chunk: Option<Compound>) -> Result<()> {
        let index = chunk_index(x, z)?;
        let slot = &mut self.slots[index];
        slot.state = match (std::mem::take(&mut slot.state), chunk) {
            (_, None) => SlotState::Empty,
            (SlotState::Empty, Some(root)) => SlotState::Decoded(NbtFile::new("", root)),
            (SlotState::Stored(stored), Some(root)) => {
                SlotState::Both(stored, NbtFile::new("", root))
            }
            (SlotState::Decoded(file), Some(root)) => {
                SlotState::Decoded(NbtFile::new(file.name, root))
            }
            (SlotState::Both(stored, file), Some(root)) => {
                SlotState::Both(stored, NbtFile::new(file.name, root))
            }
        };
        slot.dirty = true;
        Ok(())
    }

    pub fn timestamp(&self, x: i32, z: i32) -> Result<i32> {
        Ok(self.slot(x, z)?.timestamp)
    }

    pub fn set_timestamp(&mut self, x: i32, z: i32, value: i64) -> Result<()> {
        let index = chunk_index(x, z)?;
        let timestamp = i32::try_from(value).map_err(|_| QuarryError::ValueOutOfRange {
            field: "timestamp",
            value,
        })?;
        self.slots[index].timestamp = timestamp;
        Ok(())
    }

    /// Writes a compact region file, re-encoding edited chunks and converting the
    /// rest to `target` compression.
    pub fn encode(&self, target: Compression) -> Result<Vec<u8>> {
        let mut locations = vec![Location::default(); CHUNK_COUNT];
        let mut timestamps = vec![0i32; CHUNK_COUNT];
        let mut body = Vec::new();
        let mut next_sector = 2usize;

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(payload) = self.chunk_payload(index, slot, target)? else {
                continue;
            };
            let (x, z) = index_to_local(index);
            let overflow = |reason: String| QuarryError::EncodingOverflow {
                x: x as usize,
                z: z as usize,
                reason,
            };

            let length = i32::try_from(payload.len() + 1)
                .map_err(|_| overflow(format!("payload of {} bytes", payload.len())))?;
            let allocated = (4 + payload.len() + 1).div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
            let sectors = allocated / SECTOR_SIZE;
            if next_sector >= Location::MAX_OFFSET as usize {
                return Err(overflow(format!(
                    "sector offset {} does not fit in 24 bits",
                    next_sector
                )));
            }
            if sectors > u8::MAX as usize {
                return Err(overflow(format!(
                    "{} sectors exceed the limit of {}",
                    sectors,
                    u8::MAX
                )));
            }

            locations[index] = Location {
                offset: next_sector as u32,
                sectors: sectors as u8,
            };
            timestamps[index] = slot.timestamp;

            let start = body.len();
            body.write_i32::<BigEndian>(length)?;
            body.write_u8(target.id())?;
            body.extend_from_slice(&payload);
            body.resize(start + allocated, 0);
            next_sector += sectors;
        }

        debug!(
            "Encoded region with {} compression: {} sectors",
            target, next_sector
        );
        let mut out = write_tables(&locations, &timestamps);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Copies every stored chunk's sectors verbatim into a gap-free layout.
    ///
    /// Fails with `PendingEdits` when a chunk was edited; those need [`Region::encode`].
    pub fn repack(&self) -> Result<Vec<u8>> {
        if let Some(index) = self.slots.iter().position(|slot| slot.dirty) {
            let (x, z) = index_to_local(index);
            return Err(QuarryError::PendingEdits {
                x: x as usize,
                z: z as usize,
            });
        }

        let mut locations = vec![Location::default(); CHUNK_COUNT];
        let timestamps: Vec<i32> = self.slots.iter().map(|slot| slot.timestamp).collect();
        let mut body = Vec::new();
        let mut next_sector = 2usize;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(stored) = slot.state.stored() {
                let count = stored.sectors.len();
                locations[index] = Location {
                    offset: next_sector as u32,
                    sectors: count as u8,
                };
                body.extend_from_slice(
                    &self.data[stored.sectors.start * SECTOR_SIZE..stored.sectors.end * SECTOR_SIZE],
                );
                next_sector += count;
            }
        }

        debug!(
            "Repacked region: {} of {} sectors kept",
            next_sector,
            self.data.len() / SECTOR_SIZE
        );
        let mut out = write_tables(&locations, &timestamps);
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn slot(&self, x: i32, z: i32) -> Result<&Slot> {
        Ok(&self.slots[chunk_index(x, z)?])
    }

    fn chunk_payload(&self, index: usize, slot: &Slot, target: Compression) -> Result<Option<Cow<'_, [u8]>>> {
        if slot.dirty {
            return match slot.state.decoded() {
                Some(file) => Ok(Some(Cow::Owned(target.compress(&file.to_bytes()?)?))),
                None => Ok(None),
            };
        }
        let Some(stored) = slot.state.stored() else {
            return Ok(None);
        };
        let payload = &self.data[stored.payload.clone()];
        if stored.compression == target {
            return Ok(Some(Cow::Borrowed(payload)));
        }
        let (x, z) = index_to_local(index);
        trace!(
            "Recompressing chunk ({},{}) from {} to {}",
            x,
            z,
            stored.compression,
            target
        );
        let raw = stored.compression.decompress(payload)?;
        Ok(Some(Cow::Owned(target.compress(&raw)?)))
    }
}

fn parse_chunk(
    data: &[u8],
    index: usize,
    location: Location,
    sector_map: &mut SectorMap,
) -> Result<Stored> {
    let (x, z) = index_to_local(index);
    if location.offset < 2 {
        return Err(QuarryError::MalformedContainer(format!(
            "chunk ({},{}) starts at sector {}, inside the header",
            x, z, location.offset
        )));
    }
    if location.sectors == 0 {
        return Err(QuarryError::MalformedContainer(format!(
            "chunk ({},{}) at sector {} has no sectors",
            x, z, location.offset
        )));
    }

    let first = location.offset as usize;
    let sectors = first..first + location.sectors as usize;
    sector_map.claim(index, sectors.clone())?;

    let start = first * SECTOR_SIZE;
    let allocated = sectors.len() * SECTOR_SIZE;
    let length = BigEndian::read_i32(&data[start..start + 4]);
    if length < 1 || 4 + length as usize > allocated {
        return Err(QuarryError::MalformedContainer(format!(
            "chunk ({},{}) declares length {} in {} allocated bytes",
            x, z, length, allocated
        )));
    }

    let id = data[start + 4];
    let compression = Compression::from_id(id).ok_or(QuarryError::UnknownCompression {
        x: x as usize,
        z: z as usize,
        id,
    })?;
    Ok(Stored {
        compression,
        payload: start + 5..start + 4 + length as usize,
        sectors,
    })
}
