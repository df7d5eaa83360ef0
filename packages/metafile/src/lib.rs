//! metafile: user-defined metadata attached to filesystem paths.
//!
//! Every path acts as a bucket of named values kept apart from the file's
//! content. The metadata follows the file through creation, removal and
//! rename when those go through [`MetaFs`].
//!
//! ```rust
//! use metafile::{MetaFs, TypedStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let fs = MetaFs::os(dir.path());
//! fs.create_dir_all("photos").unwrap();
//! fs.put_as("photos", "album", "summer").unwrap();
//! fs.remove("photos").unwrap();
//! assert_eq!(fs.store().bucket_count(), 0);
//! ```

pub use metafile_core_store::{
    is_descendant, normalize, Bucket, Codec, MetaStore, MetaStoreBuilder, PrefixValidator,
    Snapshot, Validator, Value,
};
pub use metafile_fs::{
    FileKind, Filesystem, MetaFs, MetaFsConfig, OsFs, Persister, StatValidator, ValidatorConfig,
};
pub use metafile_serde_store::{from_value, json_store, to_value, JsonCodec, TypedStore};

/// Store-level errors.
pub use metafile_core_store::Error as StoreError;
/// Filesystem-level errors.
pub use metafile_fs::Error;
