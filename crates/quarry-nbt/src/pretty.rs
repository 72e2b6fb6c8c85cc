use crate::compound::Compound;
use crate::file::NbtFile;
use crate::list::List;
use crate::tag::Tag;
use std::fmt::{self, Write};

const INDENT: &str = "    ";

fn render(out: &mut impl Write, name: Option<&str>, tag: &Tag, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    write!(out, "{}(", tag.kind())?;
    match name {
        Some(name) => write_quoted(out, name)?,
        None => out.write_str("None")?,
    }
    out.write_str("): ")?;
    match tag {
        Tag::Byte(v) => writeln!(out, "{}", v),
        Tag::Short(v) => writeln!(out, "{}", v),
        Tag::Int(v) => writeln!(out, "{}", v),
        Tag::Long(v) => writeln!(out, "{}", v),
        Tag::Float(v) => writeln!(out, "{}", v),
        Tag::Double(v) => writeln!(out, "{}", v),
        Tag::ByteArray(v) => writeln!(out, "[{} bytes]", v.len()),
        Tag::IntArray(v) => writeln!(out, "[{} ints]", v.len()),
        Tag::LongArray(v) => writeln!(out, "[{} longs]", v.len()),
        Tag::String(v) => {
            write_quoted(out, v)?;
            out.write_char('\n')
        }
        Tag::List(list) => render_list(out, list, depth),
        Tag::Compound(compound) => render_compound(out, compound, depth),
    }
}

fn render_list(out: &mut impl Write, list: &List, depth: usize) -> fmt::Result {
    writeln!(out, "{} entries of type {}", list.len(), list.kind())?;
    open(out, depth)?;
    for tag in list {
        render(out, None, tag, depth + 1)?;
    }
    close(out, depth)
}

fn render_compound(out: &mut impl Write, compound: &Compound, depth: usize) -> fmt::Result {
    writeln!(out, "{} entries", compound.len())?;
    open(out, depth)?;
    for (name, tag) in compound.iter() {
        render(out, Some(name), tag, depth + 1)?;
    }
    close(out, depth)
}

fn open(out: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    out.write_str("{\n")
}

fn close(out: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    out.write_str("}\n")
}

fn write_quoted(out: &mut impl Write, value: &str) -> fmt::Result {
    match serde_json::to_string(value) {
        Ok(quoted) => out.write_str(&quoted),
        Err(_) => Err(fmt::Error),
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, None, self, 0)
    }
}

impl fmt::Display for NbtFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TAG_Compound(")?;
        write_quoted(f, &self.name)?;
        f.write_str("): ")?;
        render_compound(f, &self.root, 0)
    }
}
