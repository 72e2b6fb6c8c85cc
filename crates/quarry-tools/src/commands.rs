use clap::ValueEnum;
use log::{debug, info};
use quarry_common::{QuarryError, Result};
use quarry_nbt::{Compound, NbtFile};
use quarry_random::JavaRandom;
use quarry_region::{Compression, Region};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RngMethod {
    Int,
    Long,
    Bool,
    Float,
    Double,
    Gaussian,
    Bytes,
}

#[derive(Serialize)]
struct ChunkEntry<'a> {
    x: i32,
    z: i32,
    timestamp: i32,
    chunk: &'a Compound,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value).map_err(io::Error::from)?)
}

/// Root compound of an NBT file as pretty JSON.
pub fn nbt_to_json(path: &Path) -> Result<String> {
    let file = NbtFile::open(path)?;
    to_json(&file.root)
}

/// Every chunk of a region file as a JSON array of `{x, z, timestamp, chunk}`.
pub fn region_to_json(path: &Path) -> Result<String> {
    let mut region = Region::open(path)?;
    region.load_all()?;
    let mut entries = Vec::new();
    for (x, z) in region.chunks() {
        if let Some(chunk) = region.get(x, z)? {
            entries.push(ChunkEntry {
                x,
                z,
                timestamp: region.timestamp(x, z)?,
                chunk,
            });
        }
    }
    to_json(&entries)
}

/// Converts a world directory in place: `<name>.json` beside every `.dat`, and
/// `c.<x>.<z>.json` beside every `.mca` for each of its chunks.
///
/// Returns the number of files converted.
pub fn world_to_json(path: &Path) -> Result<usize> {
    if path.is_dir() {
        let mut entries = fs::read_dir(path)?.collect::<io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.path());
        let mut converted = 0;
        for entry in entries {
            converted += world_to_json(&entry.path())?;
        }
        return Ok(converted);
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("dat") => {
            let file = NbtFile::open(path)?;
            fs::write(path.with_extension("json"), to_json(&file.root)?)?;
        }
        Some("mca") => {
            let mut region = Region::open(path)?;
            region.load_all()?;
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            for (x, z) in region.chunks() {
                if let Some(chunk) = region.get(x, z)? {
                    let (cx, cz) = chunk_position(chunk).unwrap_or((x, z));
                    fs::write(dir.join(format!("c.{}.{}.json", cx, cz)), to_json(chunk)?)?;
                }
            }
        }
        _ => return Ok(0),
    }
    info!("Converted {}", path.display());
    Ok(1)
}

/// World chunk coordinates from the chunk root or its `Level` compound.
fn chunk_position(chunk: &Compound) -> Option<(i32, i32)> {
    fn position(compound: &Compound) -> Option<(i32, i32)> {
        Some((compound.get_i32("xPos")?, compound.get_i32("zPos")?))
    }
    position(chunk).or_else(|| chunk.get_compound("Level").and_then(position))
}

pub fn recompress(input: &Path, output: &Path, compression: Compression) -> Result<()> {
    let region = Region::open(input)?;
    let bytes = region.encode(compression)?;
    fs::write(output, &bytes)?;
    info!(
        "Wrote {} ({} bytes, {})",
        output.display(),
        bytes.len(),
        compression
    );
    Ok(())
}

pub fn compact(input: &Path, output: &Path) -> Result<()> {
    let before = fs::metadata(input)?.len();
    let bytes = Region::open(input)?.repack()?;
    fs::write(output, &bytes)?;
    info!(
        "Wrote {} ({} bytes, was {})",
        output.display(),
        bytes.len(),
        before
    );
    Ok(())
}

pub fn dump(path: &Path) -> Result<String> {
    Ok(NbtFile::open(path)?.to_string())
}

/// Draws `count` values. `bound` limits `int` draws and sets the array length for `bytes`.
pub fn rng(seed: i64, method: RngMethod, count: usize, bound: Option<i32>) -> Result<Vec<String>> {
    debug!("Generating {} values of {:?} from seed {}", count, method, seed);
    let mut random = JavaRandom::new(seed);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(match method {
            RngMethod::Int => match bound {
                Some(bound) => random.next_int_bounded(bound)?.to_string(),
                None => random.next_int().to_string(),
            },
            RngMethod::Long => random.next_long().to_string(),
            RngMethod::Bool => random.next_bool().to_string(),
            RngMethod::Float => random.next_float().to_string(),
            RngMethod::Double => random.next_double().to_string(),
            RngMethod::Gaussian => random.next_gaussian().to_string(),
            RngMethod::Bytes => {
                let len = bound.unwrap_or(4);
                let len = usize::try_from(len).map_err(|_| QuarryError::ValueOutOfRange {
                    field: "length",
                    value: len as i64,
                })?;
                let mut bytes = vec![0i8; len];
                random.next_bytes(&mut bytes);
                bytes
                    .iter()
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use quarry_nbt::Tag;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quarry-tools-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn chunk(x: i32, z: i32) -> Compound {
        let mut level = Compound::new();
        level.insert("xPos", x);
        level.insert("zPos", z);
        let mut root = Compound::new();
        root.insert("Level", level);
        root
    }

    fn write_region(path: &Path) {
        let mut region = Region::new();
        region.set(0, 0, Some(chunk(32, -64))).unwrap();
        region.set(1, 0, Some(Compound::new())).unwrap();
        region.set_timestamp(0, 0, 17).unwrap();
        fs::write(path, region.encode(Compression::Zlib).unwrap()).unwrap();
    }

    #[test]
    fn test_nbt_to_json() {
        let dir = scratch("nbt");
        let path = dir.join("level.dat");
        let mut root = Compound::new();
        root.insert("name", Tag::from("world"));
        NbtFile::new("", root).save(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&nbt_to_json(&path).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"name": "world"}));
        assert!(dump(&path).unwrap().starts_with("TAG_Compound(\"\"): 1 entries"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_region_to_json() {
        let dir = scratch("mca");
        let path = dir.join("r.0.0.mca");
        write_region(&path);

        let json: serde_json::Value = serde_json::from_str(&region_to_json(&path).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"x": 0, "z": 0, "timestamp": 17, "chunk": {"Level": {"xPos": 32, "zPos": -64}}},
                {"x": 1, "z": 0, "timestamp": 0, "chunk": {}}
            ])
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_world_to_json() {
        let dir = scratch("world");
        fs::create_dir_all(dir.join("region")).unwrap();
        NbtFile::new("", Compound::new()).save(dir.join("level.dat")).unwrap();
        write_region(&dir.join("region").join("r.1.-2.mca"));
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        assert_eq!(world_to_json(&dir).unwrap(), 2);
        assert!(dir.join("level.json").exists());
        assert!(dir.join("region").join("c.32.-64.json").exists());
        // No position tags, so the region-local coordinates are used.
        assert!(dir.join("region").join("c.1.0.json").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_chunk_position() {
        let mut flat = Compound::new();
        flat.insert("xPos", 3i32);
        flat.insert("zPos", 4i32);
        assert_eq!(chunk_position(&flat), Some((3, 4)));
        assert_eq!(chunk_position(&chunk(-1, 9)), Some((-1, 9)));
        assert_eq!(chunk_position(&Compound::new()), None);
    }

    #[test]
    fn test_recompress_and_compact() {
        let dir = scratch("rewrite");
        let input = dir.join("r.0.0.mca");
        write_region(&input);

        let gzip = dir.join("gzip.mca");
        recompress(&input, &gzip, Compression::Gzip).unwrap();
        let mut region = Region::open(&gzip).unwrap();
        region.load(0, 0).unwrap();
        assert_eq!(region.get(0, 0).unwrap(), Some(&chunk(32, -64)));

        let compacted = dir.join("compact.mca");
        compact(&input, &compacted).unwrap();
        assert_eq!(fs::read(&compacted).unwrap(), fs::read(&input).unwrap());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rng() {
        assert_eq!(rng(0, RngMethod::Int, 1, None).unwrap(), vec!["-1155484576"]);
        assert_eq!(rng(42, RngMethod::Int, 1, Some(10)).unwrap(), vec!["0"]);
        assert_eq!(rng(0, RngMethod::Long, 1, None).unwrap(), vec!["-4962768465676381896"]);
        assert_eq!(rng(0, RngMethod::Double, 1, None).unwrap(), vec!["0.730967787376657"]);
        assert_eq!(rng(0, RngMethod::Bool, 3, None).unwrap().len(), 3);
        assert_eq!(rng(0, RngMethod::Bytes, 2, Some(6)).unwrap()[0].split(' ').count(), 6);
        assert_matches!(
            rng(0, RngMethod::Int, 1, Some(0)),
            Err(QuarryError::ValueOutOfRange { field: "bound", .. })
        );
        assert_matches!(
            rng(0, RngMethod::Bytes, 1, Some(-1)),
            Err(QuarryError::ValueOutOfRange { field: "length", .. })
        );
    }
}
