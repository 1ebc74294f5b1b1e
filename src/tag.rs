//! Defines the [`TagIndex`] type, which maps each tag to the posts that carry
//! it.

use std::collections::BTreeMap;

/// Maps a tag to the indexes of the posts that list it. Indexes are stored in
/// the order they were appended; since the classifier appends during a
/// single forward pass over the sorted posts, each list is strictly
/// ascending (i.e., newest post first). Tags iterate alphabetically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: BTreeMap<String, Vec<usize>>,
}

impl TagIndex {
    pub fn new() -> TagIndex {
        TagIndex::default()
    }

    /// Records that the post at `index` carries `tag`, creating the tag's
    /// entry if absent. Listing the same tag twice on one post records it
    /// once.
    pub fn insert(&mut self, tag: &str, index: usize) {
        let indexes = self.tags.entry(tag.to_owned()).or_insert_with(Vec::new);
        if indexes.last() != Some(&index) {
            indexes.push(index);
        }
    }

    /// The post indexes for `tag`, or `None` if no post carries it.
    pub fn get(&self, tag: &str) -> Option<&[usize]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    /// Iterates over `(tag, post indexes)` pairs in alphabetical tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.tags.iter().map(|(t, v)| (t.as_str(), v.as_slice()))
    }

    /// Iterates over the distinct tags in alphabetical order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
