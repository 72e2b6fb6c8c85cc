use quarry_common::{QuarryError, Result};
use std::fmt;

/// Wire identifier of every tag type. `End` only ever appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagKind {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagKind {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Result<Self> {
        Ok(match id {
            0 => TagKind::End,
            1 => TagKind::Byte,
            2 => TagKind::Short,
            3 => TagKind::Int,
            4 => TagKind::Long,
            5 => TagKind::Float,
            6 => TagKind::Double,
            7 => TagKind::ByteArray,
            8 => TagKind::String,
            9 => TagKind::List,
            10 => TagKind::Compound,
            11 => TagKind::IntArray,
            12 => TagKind::LongArray,
            _ => return Err(QuarryError::UnknownTagId(id)),
        })
    }

    /// Name used by the human readable format, e.g. `TAG_Byte_Array`.
    pub fn name(self) -> &'static str {
        match self {
            TagKind::End => "TAG_End",
            TagKind::Byte => "TAG_Byte",
            TagKind::Short => "TAG_Short",
            TagKind::Int => "TAG_Int",
            TagKind::Long => "TAG_Long",
            TagKind::Float => "TAG_Float",
            TagKind::Double => "TAG_Double",
            TagKind::ByteArray => "TAG_Byte_Array",
            TagKind::String => "TAG_String",
            TagKind::List => "TAG_List",
            TagKind::Compound => "TAG_Compound",
            TagKind::IntArray => "TAG_Int_Array",
            TagKind::LongArray => "TAG_Long_Array",
        }
    }

    /// Inclusive value range of the integer kinds.
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            TagKind::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            TagKind::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            TagKind::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            TagKind::Long => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl TryFrom<u8> for TagKind {
    type Error = QuarryError;

    fn try_from(id: u8) -> Result<Self> {
        TagKind::from_id(id)
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
