//! Error types for the filesystem wrapper.

use thiserror::Error;

/// Errors from filesystem operations and the metadata kept alongside them.
#[derive(Debug, Error)]
pub enum Error {
    /// A metadata store operation failed.
    #[error("store error: {0}")]
    Store(#[from] metafile_core_store::Error),

    /// The backing filesystem failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The path resolves outside the filesystem root.
    #[error("path crosses the filesystem root: '{path}'")]
    CrossedBoundary { path: String },

    /// The configuration could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// The persistence hook failed to flush the metadata.
    #[error("persist error: {0}")]
    Persist(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// True if the underlying cause is a bucket the store rejected.
    pub fn is_bad_bucket(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_bad_bucket())
    }

    /// True if the underlying cause is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type alias for filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts() {
        let e: Error = metafile_core_store::Error::bad_bucket("x").into();
        assert!(e.is_bad_bucket());
        assert!(e.to_string().contains("store error"));
    }

    #[test]
    fn io_not_found() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(e.is_not_found());
        assert!(!e.is_bad_bucket());
    }

    #[test]
    fn crossed_boundary_display() {
        let e = Error::CrossedBoundary {
            path: "../etc".to_string(),
        };
        assert!(e.to_string().contains("../etc"));
    }
}
