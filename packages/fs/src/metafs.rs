//! A filesystem that carries a metadata store alongside it.

use std::path::PathBuf;
use std::sync::Arc;

use metafile_core_store::{normalize, Error as StoreError, MetaStore, Snapshot};
use metafile_serde_store::{JsonCodec, TypedStore};
use tracing::debug;

use crate::config::{MetaFsConfig, ValidatorConfig};
use crate::filesystem::{FileKind, Filesystem, OsFs};
use crate::{Error, Result};

/// Flushes a snapshot of the metadata somewhere durable.
///
/// No storage format ships with this crate; a persister decides where and
/// how the snapshot is written. Any matching closure is a persister.
pub trait Persister: Send + Sync {
    fn persist(
        &self,
        base: &str,
        snapshot: &Snapshot,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> Persister for F
where
    F: Fn(&str, &Snapshot) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>
        + Send
        + Sync,
{
    fn persist(
        &self,
        base: &str,
        snapshot: &Snapshot,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self(base, snapshot)
    }
}

/// A filesystem wrapper that associates metadata with every path.
///
/// Structural operations go through the wrapper so the metadata follows
/// them: creating (or truncating) a file drops its metadata, removing a path
/// drops the metadata of the path and everything below it, and renaming
/// carries the metadata to the new name.
///
/// # Example
///
/// ```rust
/// use metafile_fs::MetaFs;
/// use metafile_serde_store::TypedStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let fs = MetaFs::os(dir.path());
///
/// fs.create("notes.txt").unwrap();
/// fs.put_as("notes.txt", "author", "alice").unwrap();
///
/// fs.rename("notes.txt", "archive.txt").unwrap();
/// let author: Option<String> = fs.get_as("archive.txt", "author").unwrap();
/// assert_eq!(author.as_deref(), Some("alice"));
/// ```
pub struct MetaFs<F: Filesystem> {
    fs: Arc<F>,
    store: MetaStore,
    persister: Option<Box<dyn Persister>>,
}

impl<F: Filesystem + 'static> MetaFs<F> {
    /// Wrap `fs`, checking new buckets against the filesystem.
    pub fn new(fs: F) -> Self {
        Self::with_validator(fs, &ValidatorConfig::Filesystem)
    }

    /// Wrap `fs`, checking new buckets as `validator` describes.
    pub fn with_validator(fs: F, validator: &ValidatorConfig) -> Self {
        Self::with_base(fs, "", validator)
    }

    fn with_base(fs: F, base: impl Into<String>, validator: &ValidatorConfig) -> Self {
        let fs = Arc::new(fs);
        let store = MetaStore::builder(base, JsonCodec)
            .maybe_validator(validator.build(&fs))
            .build();
        Self {
            fs,
            store,
            persister: None,
        }
    }

    /// Wrap `fs` around an existing store.
    pub fn with_store(fs: F, store: MetaStore) -> Self {
        Self {
            fs: Arc::new(fs),
            store,
            persister: None,
        }
    }

    /// Flush through `persister` on [`flush`](Self::flush) and
    /// [`close`](Self::close).
    #[must_use]
    pub fn with_persister(mut self, persister: impl Persister + 'static) -> Self {
        self.persister = Some(Box::new(persister));
        self
    }

    pub fn store(&self) -> &MetaStore {
        &self.store
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Create or truncate a file. Its metadata is dropped; metadata of
    /// paths below it is kept.
    pub fn create(&self, path: &str) -> Result<F::File> {
        let file = self.fs.create(path)?;
        self.store.erase_bucket(path);
        debug!(path, "created file");
        Ok(file)
    }

    /// Remove a file or an empty directory along with the metadata of the
    /// path and every path below it.
    ///
    /// A path the store rejects is left on disk. The metadata is only
    /// dropped once the filesystem remove has succeeded.
    pub fn remove(&self, path: &str) -> Result<()> {
        if !self.store.is_valid(path) {
            return Err(StoreError::bad_bucket(normalize(path)).into());
        }
        self.fs.remove(path)?;
        self.store.erase_tree(path);
        debug!(path, "removed");
        Ok(())
    }

    /// Rename `from` to `to`, carrying the metadata along.
    ///
    /// A directory's metadata moves together with everything below it; a
    /// file's metadata moves on its own. Whatever metadata the replaced
    /// destination carried is dropped, even when the source had none.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let kind = self.fs.kind(from)?;
        self.fs.rename(from, to)?;
        match kind {
            FileKind::Dir => {
                self.store.erase_tree(to);
                self.store.relocate_tree(from, to);
            }
            FileKind::File | FileKind::Other => {
                self.store.erase_bucket(to);
                self.store.relocate_bucket(from, to);
            }
        }
        debug!(from, to, ?kind, "renamed");
        Ok(())
    }

    pub fn create_dir_all(&self, path: &str) -> Result<()> {
        self.fs.create_dir_all(path)
    }

    /// Hand the metadata to the persister if anything changed since the
    /// last flush.
    ///
    /// Without a persister the dirty flag is left set.
    pub fn flush(&self) -> Result<()> {
        let Some(persister) = &self.persister else {
            return Ok(());
        };
        if !self.store.is_dirty() {
            return Ok(());
        }
        let snapshot = self.store.snapshot();
        persister
            .persist(self.store.base(), &snapshot)
            .map_err(Error::Persist)?;
        self.store.mark_clean();
        debug!(buckets = snapshot.len(), "flushed metadata");
        Ok(())
    }

    /// Flush and release the filesystem.
    pub fn close(self) -> Result<()> {
        self.flush()
    }
}

impl MetaFs<OsFs> {
    /// A metadata filesystem over the OS directory `root`.
    pub fn os(root: impl Into<PathBuf>) -> Self {
        Self::from_config(MetaFsConfig::new(root))
    }

    pub fn from_config(config: MetaFsConfig) -> Self {
        let base = config.root.to_string_lossy().into_owned();
        Self::with_base(OsFs::new(config.root), base, &config.validator)
    }
}

impl<F: Filesystem> TypedStore for MetaFs<F> {
    fn meta(&self) -> &MetaStore {
        &self.store
    }
}

impl<F: Filesystem> std::fmt::Debug for MetaFs<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaFs")
            .field("store", &self.store)
            .field("persister", &self.persister.is_some())
            .finish()
    }
}
