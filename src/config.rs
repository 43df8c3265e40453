//! Configuration file handling
//!
//! The config file is JSON:
//! ```json
//! {
//!   "backend": {"type": "fs", "root_path": "/var/lib/blobs"},
//!   "timeout_secs": 30
//! }
//! ```

use crate::backends::BackendConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory used by the `fs` backend when nothing is configured
pub const DEFAULT_ROOT: &str = "blobs";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Which backend to use and how to reach it
    pub backend: BackendConfig,

    /// Per-operation deadline; no deadline when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendConfig::Fs {
                root_path: PathBuf::from(DEFAULT_ROOT),
            },
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load config from `path`, the default location, or fall back to defaults
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to a file path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path (~/.config/simpleblob/config.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("simpleblob").join("config.json"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
