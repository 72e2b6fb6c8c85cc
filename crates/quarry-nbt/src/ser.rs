use crate::compound::Compound;
use crate::file::NbtFile;
use crate::list::List;
use crate::tag::Tag;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tag::Byte(v) => serializer.serialize_i8(*v),
            Tag::Short(v) => serializer.serialize_i16(*v),
            Tag::Int(v) => serializer.serialize_i32(*v),
            Tag::Long(v) => serializer.serialize_i64(*v),
            Tag::Float(v) => serializer.serialize_f32(*v),
            Tag::Double(v) => serializer.serialize_f64(*v),
            Tag::ByteArray(v) => serializer.collect_seq(v),
            Tag::String(v) => serializer.serialize_str(v),
            Tag::List(list) => list.serialize(serializer),
            Tag::Compound(compound) => compound.serialize(serializer),
            Tag::IntArray(v) => serializer.collect_seq(v),
            Tag::LongArray(v) => serializer.collect_seq(v),
        }
    }
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl Serialize for Compound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Serializes as a single-entry map `{name: root}`.
impl Serialize for NbtFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.root)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::TagKind;
    use serde_json::json;

    #[test]
    fn test_compound_to_json_keeps_order() {
        let mut root = Compound::new();
        root.insert("z", 1i8);
        root.insert("a", "text");
        root.insert("m", vec![1i64, 2]);
        let text = serde_json::to_string(&root).unwrap();
        assert_eq!(text, r#"{"z":1,"a":"text","m":[1,2]}"#);
    }

    #[test]
    fn test_nested_values() {
        let list = List::from_tags(TagKind::Int, vec![Tag::Int(3), Tag::Int(4)]).unwrap();
        let mut level = Compound::new();
        level.insert("xPos", 5i32);
        level.insert("Sections", list);
        level.insert("Empty", List::new(TagKind::Compound));
        let mut root = Compound::new();
        root.insert("Level", level);

        let value = serde_json::to_value(NbtFile::new("", root)).unwrap();
        assert_eq!(
            value,
            json!({"": {"Level": {"xPos": 5, "Sections": [3, 4], "Empty": []}}})
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(serde_json::to_value(Tag::Double(0.5)).unwrap(), json!(0.5));
        assert_eq!(serde_json::to_value(Tag::ByteArray(vec![-1, 2])).unwrap(), json!([-1, 2]));
        assert_eq!(serde_json::to_value(Tag::Short(-300)).unwrap(), json!(-300));
    }
}
