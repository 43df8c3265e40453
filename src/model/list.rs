//! Ordered blob listings

use super::BlobInfo;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ordered sequence of blob listing entries
///
/// Lists returned by a backend are sorted ascending by name. An empty list
/// means "nothing matched"; there is no separate "absent" state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobList(Vec<BlobInfo>);

impl BlobList {
    pub fn new() -> Self {
        BlobList(Vec::new())
    }

    /// Names of all entries, in list order
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|b| b.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BlobInfo> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlobInfo> {
        self.0.iter()
    }

    pub fn push(&mut self, info: BlobInfo) {
        self.0.push(info);
    }

    /// Sort ascending by name (byte-wise lexicographic)
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Entries whose name starts with `prefix`, in the same order
    ///
    /// An empty prefix matches everything.
    pub fn with_prefix(&self, prefix: &str) -> BlobList {
        if prefix.is_empty() {
            return self.clone();
        }
        self.0
            .iter()
            .filter(|b| b.has_prefix(prefix))
            .cloned()
            .collect()
    }

    /// Sum of all entry sizes
    pub fn total_size(&self) -> u64 {
        self.0.iter().map(|b| b.size).sum()
    }

    pub fn into_vec(self) -> Vec<BlobInfo> {
        self.0
    }
}

impl From<Vec<BlobInfo>> for BlobList {
    fn from(entries: Vec<BlobInfo>) -> Self {
        BlobList(entries)
    }
}

impl FromIterator<BlobInfo> for BlobList {
    fn from_iter<I: IntoIterator<Item = BlobInfo>>(iter: I) -> Self {
        BlobList(iter.into_iter().collect())
    }
}

impl IntoIterator for BlobList {
    type Item = BlobInfo;
    type IntoIter = std::vec::IntoIter<BlobInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BlobList {
    type Item = &'a BlobInfo;
    type IntoIter = std::slice::Iter<'a, BlobInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Index<usize> for BlobList {
    type Output = BlobInfo;

    fn index(&self, index: usize) -> &BlobInfo {
        &self.0[index]
    }
}
