//! Serde Integration for metafile stores
//!
//! This layer provides typed access to a `MetaStore` via serde. It adds:
//! - `JsonCodec`: The default codec, storing values as JSON
//! - `TypedStore`: Put Rust types in, get Rust types out
//! - Value <-> serde conversions
//!
//! # Example
//!
//! ```rust
//! use metafile_serde_store::{json_store, TypedStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Owner {
//!     name: String,
//!     uid: u32,
//! }
//!
//! let store = json_store("");
//! let owner = Owner { name: "alice".into(), uid: 1000 };
//! store.put_as("docs/report.txt", "owner", &owner).unwrap();
//!
//! let mut got = Owner { name: String::new(), uid: 0 };
//! assert!(store.get_into("/docs//report.txt", "owner", &mut got).unwrap());
//! assert_eq!(got, owner);
//! ```

pub use bytes::Bytes;

mod codec;
mod convert;
mod typed;

pub use codec::JsonCodec;
pub use convert::{from_value, json_to_value, to_value, value_to_json};
pub use typed::TypedStore;

// Re-export core types for convenience
pub use metafile_core_store::{Codec, Error, MetaStore, Result, Validator, Value};

/// Create a store that encodes every value as JSON and trusts every path.
pub fn json_store(base: impl Into<String>) -> MetaStore {
    MetaStore::new(base, JsonCodec)
}
