use crate::compound::Compound;
use crate::kind::TagKind;
use crate::list::List;
use crate::tag::Tag;
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use quarry_common::{QuarryError, Result};
use std::io::{self, Cursor, Read, Write};

/// Nesting limit for lists and compounds; deeper input is rejected instead of
/// exhausting the stack.
pub const MAX_DEPTH: usize = 128;

// Upper bound on speculative preallocation for element counts read off the wire.
const PREALLOC_LIMIT: usize = 4096;

impl Tag {
    /// Reads one named tag. Returns `None` when the next id is the end marker.
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<(String, Tag)>> {
        read_named(reader, 0)
    }

    /// Reads a bare payload of the given kind, as found inside a list.
    pub fn read_payload<R: Read>(reader: &mut R, kind: TagKind) -> Result<Tag> {
        read_payload(reader, kind, 0)
    }

    /// Writes the id byte, the name and the payload.
    pub fn write<W: Write>(&self, writer: &mut W, name: &str) -> Result<()> {
        writer.write_u8(self.id())?;
        write_string(writer, name)?;
        self.write_payload(writer)
    }

    pub fn write_payload<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Tag::Byte(v) => writer.write_i8(*v)?,
            Tag::Short(v) => writer.write_i16::<BigEndian>(*v)?,
            Tag::Int(v) => writer.write_i32::<BigEndian>(*v)?,
            Tag::Long(v) => writer.write_i64::<BigEndian>(*v)?,
            Tag::Float(v) => writer.write_f32::<BigEndian>(*v)?,
            Tag::Double(v) => writer.write_f64::<BigEndian>(*v)?,
            Tag::ByteArray(v) => {
                write_len(writer, v.len(), "byte array length")?;
                for &b in v {
                    writer.write_i8(b)?;
                }
            }
            Tag::String(v) => write_string(writer, v)?,
            Tag::List(list) => {
                writer.write_u8(list.kind().id())?;
                write_len(writer, list.len(), "list length")?;
                for tag in list {
                    tag.write_payload(writer)?;
                }
            }
            Tag::Compound(compound) => write_compound(writer, compound)?,
            Tag::IntArray(v) => {
                write_len(writer, v.len(), "int array length")?;
                for &i in v {
                    writer.write_i32::<BigEndian>(i)?;
                }
            }
            Tag::LongArray(v) => {
                write_len(writer, v.len(), "long array length")?;
                for &l in v {
                    writer.write_i64::<BigEndian>(l)?;
                }
            }
        }
        Ok(())
    }
}

/// Decodes the named tag starting at `offset`, returning it with the offset just past it.
pub fn decode(bytes: &[u8], offset: usize) -> Result<(String, Tag, usize)> {
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(offset as u64);
    match Tag::read(&mut cursor)? {
        Some((name, tag)) => Ok((name, tag, cursor.position() as usize)),
        None => Err(QuarryError::MalformedTag(format!(
            "end marker at offset {} where a tag was expected",
            offset
        ))),
    }
}

/// Encodes a named tag into a fresh buffer.
pub fn encode(name: &str, tag: &Tag) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    tag.write(&mut buffer, name)?;
    Ok(buffer)
}

pub(crate) fn write_compound<W: Write>(writer: &mut W, compound: &Compound) -> Result<()> {
    for (name, tag) in compound.iter() {
        tag.write(writer, name)?;
    }
    writer.write_u8(TagKind::End.id())?;
    Ok(())
}

pub(crate) fn read_compound<R: Read>(reader: &mut R, depth: usize) -> Result<Compound> {
    if depth >= MAX_DEPTH {
        return Err(QuarryError::MalformedTag(format!(
            "nesting deeper than {} levels",
            MAX_DEPTH
        )));
    }
    let mut compound = Compound::new();
    while let Some((name, tag)) = read_named(reader, depth + 1)? {
        compound.try_insert(name, tag)?;
    }
    Ok(compound)
}

fn read_named<R: Read>(reader: &mut R, depth: usize) -> Result<Option<(String, Tag)>> {
    let kind = TagKind::from_id(reader.read_u8()?)?;
    if kind == TagKind::End {
        return Ok(None);
    }
    let name = read_string(reader)?;
    let tag = read_payload(reader, kind, depth)?;
    Ok(Some((name, tag)))
}

fn read_payload<R: Read>(reader: &mut R, kind: TagKind, depth: usize) -> Result<Tag> {
    match kind {
        TagKind::List => read_list(reader, depth),
        TagKind::Compound => Ok(Tag::Compound(read_compound(reader, depth)?)),
        _ => read_flat(reader, kind),
    }
}

// Kept out of the recursive path so each nesting level only pays for a small frame.
#[inline(never)]
fn read_flat<R: Read>(reader: &mut R, kind: TagKind) -> Result<Tag> {
    Ok(match kind {
        TagKind::Byte => Tag::Byte(reader.read_i8()?),
        TagKind::Short => Tag::Short(reader.read_i16::<BigEndian>()?),
        TagKind::Int => Tag::Int(reader.read_i32::<BigEndian>()?),
        TagKind::Long => Tag::Long(reader.read_i64::<BigEndian>()?),
        TagKind::Float => Tag::Float(reader.read_f32::<BigEndian>()?),
        TagKind::Double => Tag::Double(reader.read_f64::<BigEndian>()?),
        TagKind::ByteArray => {
            let len = read_len(reader, "byte array")?;
            let bytes = read_bytes(reader, len)?;
            Tag::ByteArray(bytes.into_iter().map(|b| b as i8).collect())
        }
        TagKind::String => Tag::String(read_string(reader)?),
        TagKind::IntArray => {
            let len = read_len(reader, "int array")?;
            let bytes = read_bytes(reader, byte_len(len, 4)?)?;
            Tag::IntArray(bytes.chunks_exact(4).map(BigEndian::read_i32).collect())
        }
        TagKind::LongArray => {
            let len = read_len(reader, "long array")?;
            let bytes = read_bytes(reader, byte_len(len, 8)?)?;
            Tag::LongArray(bytes.chunks_exact(8).map(BigEndian::read_i64).collect())
        }
        TagKind::End => {
            return Err(QuarryError::MalformedTag(
                "end marker has no payload".to_owned(),
            ))
        }
        TagKind::List | TagKind::Compound => {
            return Err(QuarryError::MalformedTag(format!(
                "{} is not a flat payload",
                kind
            )))
        }
    })
}

fn read_list<R: Read>(reader: &mut R, depth: usize) -> Result<Tag> {
    if depth >= MAX_DEPTH {
        return Err(QuarryError::MalformedTag(format!(
            "nesting deeper than {} levels",
            MAX_DEPTH
        )));
    }
    let element = TagKind::from_id(reader.read_u8()?)?;
    let len = read_len(reader, "list")?;
    if element == TagKind::End && len > 0 {
        return Err(QuarryError::MalformedTag(format!(
            "list of {} with {} elements",
            element, len
        )));
    }
    let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    for _ in 0..len {
        items.push(read_payload(reader, element, depth + 1)?);
    }
    Ok(Tag::List(List::from_tags(element, items)?))
}

fn read_len<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let len = reader.read_i32::<BigEndian>()?;
    usize::try_from(len)
        .map_err(|_| QuarryError::MalformedTag(format!("{} has negative length {}", what, len)))
}

fn byte_len(count: usize, width: usize) -> Result<usize> {
    count
        .checked_mul(width)
        .ok_or_else(|| QuarryError::MalformedTag(format!("array of {} elements is too large", count)))
}

// Reads through `take` so a corrupt length cannot force a huge allocation up front.
fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, found {}", len, buf.len()),
        )
        .into());
    }
    Ok(buf)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let bytes = read_bytes(reader, len)?;
    String::from_utf8(bytes)
        .map_err(|e| QuarryError::MalformedTag(format!("string is not valid UTF-8: {}", e)))
}

pub(crate) fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| QuarryError::ValueOutOfRange {
        field: "string length",
        value: value.len() as i64,
    })?;
    writer.write_u16::<BigEndian>(len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn write_len<W: Write>(writer: &mut W, len: usize, field: &'static str) -> Result<()> {
    let len = i32::try_from(len).map_err(|_| QuarryError::ValueOutOfRange {
        field,
        value: len as i64,
    })?;
    writer.write_i32::<BigEndian>(len)?;
    Ok(())
}
