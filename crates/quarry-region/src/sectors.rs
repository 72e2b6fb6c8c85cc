use crate::index_to_local;
use quarry_common::{QuarryError, Result};
use std::ops::Range;

/// Tracks which chunk owns each sector of a region file.
pub(crate) struct SectorMap {
    owners: Vec<Option<usize>>,
}

impl SectorMap {
    pub fn new(sector_count: usize) -> Self {
        SectorMap {
            owners: vec![None; sector_count],
        }
    }

    /// Claims `sectors` for the chunk in slot `index`. Nothing is claimed on failure.
    pub fn claim(&mut self, index: usize, sectors: Range<usize>) -> Result<()> {
        let (x, z) = index_to_local(index);
        let (x, z) = (x as usize, z as usize);
        for sector in sectors.clone() {
            match self.owners.get(sector) {
                None => {
                    return Err(QuarryError::SectorOutOfRange {
                        x,
                        z,
                        sector,
                        available: self.owners.len(),
                    })
                }
                Some(Some(owner)) => {
                    let (owner_x, owner_z) = index_to_local(*owner);
                    return Err(QuarryError::OverlappingAllocation {
                        x,
                        z,
                        owner_x: owner_x as usize,
                        owner_z: owner_z as usize,
                        sector,
                    });
                }
                Some(None) => {}
            }
        }
        for sector in sectors {
            self.owners[sector] = Some(index);
        }
        Ok(())
    }
}
