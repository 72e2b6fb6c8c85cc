use crate::compound::Compound;
use crate::kind::TagKind;
use crate::list::List;
use quarry_common::{QuarryError, Result};

/// A tag value. Names live in the enclosing `Compound` or `NbtFile`.
///
/// Equality is bitwise for `Float` and `Double`, so a tree holding NaN equals
/// its own decode while `0.0` and `-0.0` stay distinct.
#[derive(Debug, Clone)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Tag::Byte(a), Tag::Byte(b)) => a == b,
            (Tag::Short(a), Tag::Short(b)) => a == b,
            (Tag::Int(a), Tag::Int(b)) => a == b,
            (Tag::Long(a), Tag::Long(b)) => a == b,
            (Tag::Float(a), Tag::Float(b)) => a.to_bits() == b.to_bits(),
            (Tag::Double(a), Tag::Double(b)) => a.to_bits() == b.to_bits(),
            (Tag::ByteArray(a), Tag::ByteArray(b)) => a == b,
            (Tag::String(a), Tag::String(b)) => a == b,
            (Tag::List(a), Tag::List(b)) => a == b,
            (Tag::Compound(a), Tag::Compound(b)) => a == b,
            (Tag::IntArray(a), Tag::IntArray(b)) => a == b,
            (Tag::LongArray(a), Tag::LongArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Byte(_) => TagKind::Byte,
            Tag::Short(_) => TagKind::Short,
            Tag::Int(_) => TagKind::Int,
            Tag::Long(_) => TagKind::Long,
            Tag::Float(_) => TagKind::Float,
            Tag::Double(_) => TagKind::Double,
            Tag::ByteArray(_) => TagKind::ByteArray,
            Tag::String(_) => TagKind::String,
            Tag::List(_) => TagKind::List,
            Tag::Compound(_) => TagKind::Compound,
            Tag::IntArray(_) => TagKind::IntArray,
            Tag::LongArray(_) => TagKind::LongArray,
        }
    }

    pub fn id(&self) -> u8 {
        self.kind().id()
    }

    /// Builds an integer tag of the given width, rejecting values that do not fit.
    pub fn integer(kind: TagKind, value: i64) -> Result<Tag> {
        let (min, max) = kind.integer_range().ok_or_else(|| {
            QuarryError::InvalidTag(format!("{} is not an integer kind", kind))
        })?;
        if value < min || value > max {
            return Err(QuarryError::ValueOutOfRange {
                field: kind.name(),
                value,
            });
        }
        Ok(match kind {
            TagKind::Byte => Tag::Byte(value as i8),
            TagKind::Short => Tag::Short(value as i16),
            TagKind::Int => Tag::Int(value as i32),
            _ => Tag::Long(value),
        })
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            Tag::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Tag::Short(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Tag::Byte(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Tag::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Tag::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Any integer width widened to i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Tag::Byte(n) => Some(*n as i64),
            Tag::Short(n) => Some(*n as i64),
            Tag::Int(n) => Some(*n as i64),
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[i8]> {
        match self {
            Tag::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Tag::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Tag::LongArray(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! tag_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Tag {
                fn from(value: $source) -> Self {
                    Tag::$variant(value)
                }
            }
        )*
    };
}

tag_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<i8> => ByteArray,
    String => String,
    List => List,
    Compound => Compound,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_owned())
    }
}
