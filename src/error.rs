//! Error types for simpleblob

use thiserror::Error;

/// Result type alias for simpleblob operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blob storage operations
#[derive(Error, Debug)]
pub enum Error {
    /// Load of a blob name that does not exist
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// The operation context was canceled before the operation completed
    #[error("Operation canceled")]
    Canceled,

    /// The operation context deadline passed before the operation completed
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid blob name: {0:?}")]
    InvalidName(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True if this error means the requested blob does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// True if the operation was aborted by its context
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled | Error::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::NotFound("x".into()).is_not_found());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(Error::from(io).is_not_found());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(!Error::from(denied).is_not_found());
        assert!(!Error::Canceled.is_not_found());
    }

    #[test]
    fn test_canceled_classification() {
        assert!(Error::Canceled.is_canceled());
        assert!(Error::DeadlineExceeded.is_canceled());
        assert!(!Error::NotFound("x".into()).is_canceled());
    }
}
