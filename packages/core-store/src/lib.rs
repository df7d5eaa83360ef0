//! Core metafile store: path-addressed metadata buckets
//!
//! Every filesystem path names a bucket that can hold named values, separate
//! from the file's content. This crate holds the in-memory engine:
//! - `normalize`: Canonical bucket identity for a path spelling
//! - `Validator`: Gate for buckets the store has not seen yet
//! - `Codec`: Converts `Value`s to and from the opaque bytes kept per key
//! - `MetaStore`: Put/Get/Delete/Empty/Move plus the hooks a filesystem
//!   wrapper and a persistence layer need
//!
//! Nothing here performs I/O. Typed access through serde lives in
//! `metafile-serde-store`; the filesystem wrapper in `metafile-fs`.

pub use bytes::Bytes;

mod error;
pub mod path;
mod store;
mod traits;
mod validator;
mod value;

pub use error::{Error, Result};
pub use path::{is_descendant, normalize};
pub use store::{Bucket, MetaStore, MetaStoreBuilder, Snapshot};
pub use traits::{Codec, Validator};
pub use validator::PrefixValidator;
pub use value::Value;
