use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use quarry_common::Result;
use std::fmt;
use std::io::{Read, Write};

/// Per-chunk compression scheme, identified on the wire by one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Compression {
    Gzip = 1,
    Zlib = 2,
    Raw = 3,
}

impl Compression {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Compression::Gzip),
            2 => Some(Compression::Zlib),
            3 => Some(Compression::Raw),
            _ => None,
        }
    }

    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(match self {
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()?
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()?
            }
            Compression::Raw => data.to_vec(),
        })
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        match self {
            Compression::Gzip => {
                GzDecoder::new(data).read_to_end(&mut decompressed)?;
            }
            Compression::Zlib => {
                ZlibDecoder::new(data).read_to_end(&mut decompressed)?;
            }
            Compression::Raw => decompressed.extend_from_slice(data),
        }
        Ok(decompressed)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
            Compression::Raw => "raw",
        })
    }
}
