use crate::tag::Tag;
use quarry_common::{QuarryError, Result};
use std::collections::HashMap;
use std::fmt;

/// Named tags kept in insertion order, so encoding reproduces the order they were read in.
#[derive(Clone, Default)]
pub struct Compound {
    entries: Vec<(String, Tag)>,
    index: HashMap<String, usize>,
}

impl Compound {
    pub fn new() -> Self {
        Compound::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
        let i = *self.index.get(name)?;
        Some(&mut self.entries[i].1)
    }

    pub fn get_compound(&self, name: &str) -> Option<&Compound> {
        self.get(name).and_then(Tag::as_compound)
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(Tag::as_i32)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Tag::as_str)
    }

    /// Inserts or replaces. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        let name = name.into();
        let tag = tag.into();
        match self.index.get(&name) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, tag)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, tag));
                None
            }
        }
    }

    /// Appends a new entry, failing if the name is already present.
    pub fn try_insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Result<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(QuarryError::DuplicateKey(name));
        }
        self.insert(name, tag);
        Ok(())
    }

    /// Removes an entry; later entries keep their relative order.
    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        let i = self.index.remove(name)?;
        let (_, tag) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Tag> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Tag>> FromIterator<(K, V)> for Compound {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut compound = Compound::new();
        for (k, v) in iter {
            compound.insert(k, v);
        }
        compound
    }
}

impl IntoIterator for Compound {
    type Item = (String, Tag);
    type IntoIter = std::vec::IntoIter<(String, Tag)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
