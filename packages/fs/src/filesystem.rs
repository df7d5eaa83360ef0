//! The filesystem abstraction the wrapper sits on, and its `std::fs` adapter.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use metafile_core_store::normalize;

use crate::{Error, Result};

/// What a path refers to on the backing filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    /// Symlinks, sockets, devices and the like.
    Other,
}

/// Structural operations of a filesystem.
///
/// Paths are relative to the filesystem's root and use `/` separators.
pub trait Filesystem: Send + Sync {
    /// Handle returned by [`create`](Self::create).
    type File;

    /// Create the named file, truncating it if it exists. Missing parent
    /// directories are created.
    fn create(&self, path: &str) -> Result<Self::File>;

    /// Remove a file or an empty directory.
    fn remove(&self, path: &str) -> Result<()>;

    /// Rename `from` to `to`, replacing `to` if it is a file.
    fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Report what `path` is. Fails if it does not exist.
    fn kind(&self, path: &str) -> Result<FileKind>;

    /// Create a directory and all of its missing parents.
    fn create_dir_all(&self, path: &str) -> Result<()>;
}

/// A [`Filesystem`] backed by the OS, rooted at a directory.
///
/// Paths may not climb above the root.
#[derive(Debug, Clone)]
pub struct OsFs {
    root: PathBuf,
}

impl OsFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a relative path onto the OS path under the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let clean = normalize(path);
        if clean == ".." || clean.starts_with("../") {
            return Err(Error::CrossedBoundary {
                path: path.to_string(),
            });
        }
        if clean.is_empty() {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(clean))
    }

    fn ensure_parent(target: &Path) -> Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Filesystem for OsFs {
    type File = File;

    fn create(&self, path: &str) -> Result<File> {
        let target = self.resolve(path)?;
        Self::ensure_parent(&target)?;
        Ok(File::create(target)?)
    }

    fn remove(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if fs::symlink_metadata(&target)?.is_dir() {
            fs::remove_dir(target)?;
        } else {
            fs::remove_file(target)?;
        }
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        Self::ensure_parent(&target)?;
        fs::rename(source, target)?;
        Ok(())
    }

    fn kind(&self, path: &str) -> Result<FileKind> {
        let meta = fs::symlink_metadata(self.resolve(path)?)?;
        let kind = if meta.is_dir() {
            FileKind::Dir
        } else if meta.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        };
        Ok(kind)
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path)?)?;
        Ok(())
    }
}
