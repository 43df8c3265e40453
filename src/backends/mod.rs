//! Pluggable storage backends
//!
//! Every backend implements [`Interface`]. [`open`] builds one from a
//! [`BackendConfig`], so callers can pick a backend at runtime.

mod fs;
mod memory;
mod traits;

pub use fs::{allowed_name, FsBackend};
pub use memory::MemoryBackend;
pub use traits::Interface;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Names accepted by [`BackendConfig::from_options`]
pub const BACKEND_TYPES: &[&str] = &["memory", "fs"];

/// Backend selection and its options, tagged by `type`
///
/// ```json
/// {"type": "fs", "root_path": "/var/lib/blobs"}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Memory,
    Fs { root_path: PathBuf },
}

impl BackendConfig {
    /// Build a config from a backend type name and its free-form options
    pub fn from_options(type_name: &str, options: serde_json::Value) -> Result<Self> {
        if !BACKEND_TYPES.contains(&type_name) {
            return Err(Error::Config(format!(
                "unknown backend type '{}' (expected one of: {})",
                type_name,
                BACKEND_TYPES.join(", ")
            )));
        }

        let mut fields = match options {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(Error::Config(format!(
                    "backend options must be an object, got {}",
                    other
                )))
            }
        };
        fields.insert("type".into(), serde_json::Value::String(type_name.into()));

        serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| Error::Config(format!("invalid {} backend options: {}", type_name, e)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::Fs { .. } => "fs",
        }
    }
}

/// Build the backend described by `config`
pub fn open(config: &BackendConfig) -> Result<Box<dyn Interface>> {
    tracing::debug!(backend = config.type_name(), "opening backend");
    match config {
        BackendConfig::Memory => Ok(Box::new(MemoryBackend::new())),
        BackendConfig::Fs { root_path } => Ok(Box::new(FsBackend::new(root_path)?)),
    }
}
