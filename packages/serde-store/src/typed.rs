//! Typed put/get extension trait.

use std::sync::Arc;

use metafile_core_store::{normalize, Error, MetaStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::convert::{from_value, to_value};

/// Extension trait for typed access to a `MetaStore`.
///
/// Implementors only provide [`meta`](Self::meta); the typed operations are
/// built on the store's `Value` API.
///
/// # Example
///
/// ```rust
/// use metafile_serde_store::{json_store, TypedStore};
///
/// let store = json_store("");
/// store.put_as("x", "count", &42u32).unwrap();
///
/// let mut count = 0u32;
/// assert!(store.get_into("x", "count", &mut count).unwrap());
/// assert_eq!(count, 42);
///
/// // a missing key leaves the target alone
/// assert!(!store.get_into("x", "missing", &mut count).unwrap());
/// assert_eq!(count, 42);
/// ```
pub trait TypedStore {
    /// The underlying store.
    fn meta(&self) -> &MetaStore;

    /// Serialize `value` and store it under `key` in the bucket at `path`.
    ///
    /// Nothing is written if serialization fails.
    fn put_as<T: Serialize + ?Sized>(&self, path: &str, key: &str, value: &T) -> Result<(), Error> {
        let value = to_value(value)?;
        self.meta().put(path, key, &value)
    }

    /// Decode the value under `key` into `target`.
    ///
    /// Returns `Ok(false)` and leaves `target` untouched if the key is
    /// absent. If the stored value does not fit `T` the error is `Decoding`,
    /// naming the bucket and key, and `target` is likewise untouched.
    ///
    /// `target` is a `&mut T`, so a non-writable target cannot be passed.
    fn get_into<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
        target: &mut T,
    ) -> Result<bool, Error> {
        match self.get_as(path, key)? {
            Some(value) => {
                *target = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Decode the value under `key` as a `T`.
    fn get_as<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Option<T>, Error> {
        let Some(value) = self.meta().get(path, key)? else {
            return Ok(None);
        };
        from_value(value).map(Some).map_err(|e| {
            let bucket = normalize(path);
            trace!(bucket = %bucket, key, error = %e, "typed decode failed");
            e.at(&bucket, key)
        })
    }
}

impl TypedStore for MetaStore {
    fn meta(&self) -> &MetaStore {
        self
    }
}

impl TypedStore for Arc<MetaStore> {
    fn meta(&self) -> &MetaStore {
        self
    }
}
