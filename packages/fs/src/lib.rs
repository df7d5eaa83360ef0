//! Metadata-carrying filesystem
//!
//! Wraps a filesystem and keeps a `MetaStore` in step with it:
//! - `Filesystem`: The structural operations the wrapper needs
//! - `OsFs`: `Filesystem` over a directory on the OS filesystem
//! - `MetaFs`: The wrapper; create, remove and rename update the metadata
//! - `MetaFsConfig`: Serde configuration, including how new buckets are checked
//! - `Persister`: Hook that receives the metadata on flush/close
//!
//! # Example
//!
//! ```rust
//! use metafile_fs::{MetaFs, MetaFsConfig, ValidatorConfig};
//! use metafile_serde_store::TypedStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = MetaFsConfig::new(dir.path()).validator(ValidatorConfig::Always);
//! let fs = MetaFs::from_config(config);
//!
//! fs.put_as("not/on/disk", "tag", "draft").unwrap();
//! ```

mod config;
mod error;
mod filesystem;
mod metafs;

pub use config::{MetaFsConfig, StatValidator, ValidatorConfig};
pub use error::{Error, Result};
pub use filesystem::{FileKind, Filesystem, OsFs};
pub use metafs::{MetaFs, Persister};
