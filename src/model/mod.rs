//! Core data model types for simpleblob

mod blob;
mod list;

pub use blob::BlobInfo;
pub use list::BlobList;
