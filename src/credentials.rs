//! File-based credentials for authenticated backends
//!
//! Reads an access key and a secret key from two files, as mounted by
//! Kubernetes or Docker secrets (e.g. /etc/s3-secrets/access-key).
//! Backends that need authentication take a [`CredentialProvider`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// An access key pair
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialValue {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialValue")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Source of credentials for a backend
pub trait CredentialProvider: Send + Sync {
    /// Whether previously retrieved credentials must be fetched again
    fn is_expired(&self) -> bool;

    /// Fetch the current credentials
    fn retrieve(&self) -> Result<CredentialValue>;
}

/// Credentials read from two secret files
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSecretsCredentials {
    /// Path to the file containing the access key
    pub access_key_file: PathBuf,
    /// Path to the file containing the secret key
    pub secret_key_file: PathBuf,
}

impl FileSecretsCredentials {
    pub fn new(access_key_file: impl Into<PathBuf>, secret_key_file: impl Into<PathBuf>) -> Self {
        FileSecretsCredentials {
            access_key_file: access_key_file.into(),
            secret_key_file: secret_key_file.into(),
        }
    }
}

impl CredentialProvider for FileSecretsCredentials {
    /// Always true: a file change cannot be detected reliably on every
    /// filesystem without opening it, so `retrieve` reads both files on
    /// every call.
    fn is_expired(&self) -> bool {
        true
    }

    fn retrieve(&self) -> Result<CredentialValue> {
        let access_key_id = read_key(&self.access_key_file)?;
        let secret_access_key = read_key(&self.secret_key_file)?;

        tracing::debug!(
            access_key_file = %self.access_key_file.display(),
            "retrieved file credentials"
        );
        Ok(CredentialValue {
            access_key_id,
            secret_access_key,
        })
    }
}

/// Read a key file verbatim
///
/// Keys are text; a file that is not UTF-8 is a configuration error rather
/// than an I/O failure.
fn read_key(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|_| Error::Config(format!("Key file {} is not valid UTF-8", path.display())))
}
