//! NBT documents and Anvil region files.
//!
//! Re-exports the workspace crates under one name.

pub use quarry_common::{QuarryError, Result};
pub use quarry_random::JavaRandom;

pub mod nbt {
    pub use quarry_nbt::*;
}

pub mod region {
    pub use quarry_region::*;
}

pub use nbt::{Compound, List, NbtFile, Tag, TagKind};
pub use region::{Compression, Region};
