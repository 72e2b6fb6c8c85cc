use thiserror::Error;

/// Every failure the codec, the region container and the generator can report.
#[derive(Debug, Error)]
pub enum QuarryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("sector {sector} is claimed by chunk ({x},{z}) and chunk ({owner_x},{owner_z})")]
    OverlappingAllocation {
        x: usize,
        z: usize,
        owner_x: usize,
        owner_z: usize,
        sector: usize,
    },

    #[error("chunk ({x},{z}) claims sector {sector} but the file only has {available} sectors")]
    SectorOutOfRange {
        x: usize,
        z: usize,
        sector: usize,
        available: usize,
    },

    #[error("chunk coordinate ({x},{z}) is outside the 32x32 region grid")]
    InvalidCoordinate { x: i32, z: i32 },

    #[error("{field} value {value} is out of range")]
    ValueOutOfRange { field: &'static str, value: i64 },

    #[error("compound key {0:?} is duplicated")]
    DuplicateKey(String),

    #[error("unknown tag id {0}")]
    UnknownTagId(u8),

    #[error("chunk ({x},{z}) uses unknown compression id {id}")]
    UnknownCompression { x: usize, z: usize, id: u8 },

    #[error("malformed tag data: {0}")]
    MalformedTag(String),

    #[error("invalid tag: {0}")]
    InvalidTag(String),

    #[error("chunk ({x},{z}) cannot be encoded: {reason}")]
    EncodingOverflow { x: usize, z: usize, reason: String },

    #[error("chunk ({x},{z}) has pending edits, a full encode is required")]
    PendingEdits { x: usize, z: usize },
}

impl QuarryError {
    /// True for the failures that reject a region file during construction.
    pub fn is_container_fault(&self) -> bool {
        matches!(
            self,
            QuarryError::MalformedContainer(_)
                | QuarryError::OverlappingAllocation { .. }
                | QuarryError::SectorOutOfRange { .. }
                | QuarryError::UnknownCompression { .. }
        )
    }
}
