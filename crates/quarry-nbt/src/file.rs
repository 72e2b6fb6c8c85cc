use crate::codec::{write_compound, write_string};
use crate::compound::Compound;
use crate::kind::TagKind;
use crate::tag::Tag;
use byteorder::WriteBytesExt;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use quarry_common::{QuarryError, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// A complete NBT document: one named root compound.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbtFile {
    pub name: String,
    pub root: Compound,
}

impl NbtFile {
    pub fn new(name: impl Into<String>, root: Compound) -> Self {
        NbtFile {
            name: name.into(),
            root,
        }
    }

    /// Reads an uncompressed document.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        match Tag::read(reader)? {
            Some((name, Tag::Compound(root))) => Ok(NbtFile { name, root }),
            Some((_, other)) => Err(QuarryError::InvalidTag(format!(
                "document root is {}, expected {}",
                other.kind(),
                TagKind::Compound
            ))),
            None => Err(QuarryError::InvalidTag("document is empty".to_owned())),
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(TagKind::Compound.id())?;
        write_string(writer, &self.name)?;
        write_compound(writer, &self.root)
    }

    pub fn read_gzip<R: Read>(reader: &mut R) -> Result<Self> {
        let mut decoder = GzDecoder::new(reader);
        Self::read(&mut decoder)
    }

    pub fn write_gzip<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        self.write(&mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    /// Decodes gzip-compressed bytes, falling back to raw NBT when they are not gzip.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut inflated = Vec::new();
        match GzDecoder::new(bytes).read_to_end(&mut inflated) {
            Ok(_) => Self::read(&mut inflated.as_slice()),
            Err(_) => Self::read(&mut &bytes[..]),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    pub fn to_gzip_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_gzip(&mut buffer)?;
        Ok(buffer)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?)
    }

    /// Writes the document gzip-compressed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_gzip_bytes()?)?;
        Ok(())
    }
}
