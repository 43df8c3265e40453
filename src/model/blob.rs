//! Listing entry for a single blob

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata for one stored blob: its name and content size in bytes
///
/// A listing entry never carries content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobInfo {
    pub name: String,
    pub size: u64,
}

impl BlobInfo {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        BlobInfo {
            name: name.into(),
            size,
        }
    }

    /// Check whether the blob name starts with `prefix`
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.name.starts_with(prefix)
    }
}

impl fmt::Display for BlobInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}
