use crate::kind::TagKind;
use crate::tag::Tag;
use quarry_common::{QuarryError, Result};

/// A homogeneous list. The element kind is kept even when the list is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    kind: TagKind,
    items: Vec<Tag>,
}

impl List {
    pub fn new(kind: TagKind) -> Self {
        List {
            kind,
            items: Vec::new(),
        }
    }

    /// Builds a list, checking that every element is of `kind`.
    pub fn from_tags(kind: TagKind, items: Vec<Tag>) -> Result<Self> {
        for item in &items {
            check_kind(kind, item)?;
        }
        Ok(List { kind, items })
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    pub fn push(&mut self, tag: impl Into<Tag>) -> Result<()> {
        let tag = tag.into();
        check_kind(self.kind, &tag)?;
        self.items.push(tag);
        Ok(())
    }

    /// Replaces the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, tag: impl Into<Tag>) -> Result<Tag> {
        let tag = tag.into();
        check_kind(self.kind, &tag)?;
        let len = self.items.len();
        let slot = self.items.get_mut(index).ok_or_else(|| {
            QuarryError::InvalidTag(format!("list index {} out of bounds ({})", index, len))
        })?;
        Ok(std::mem::replace(slot, tag))
    }

    pub fn pop(&mut self) -> Option<Tag> {
        self.items.pop()
    }

    pub fn remove(&mut self, index: usize) -> Option<Tag> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn into_tags(self) -> Vec<Tag> {
        self.items
    }
}

impl Default for List {
    fn default() -> Self {
        List::new(TagKind::End)
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn check_kind(kind: TagKind, tag: &Tag) -> Result<()> {
    if tag.kind() != kind {
        return Err(QuarryError::InvalidTag(format!(
            "list of {} cannot hold a {} element",
            kind,
            tag.kind()
        )));
    }
    Ok(())
}
