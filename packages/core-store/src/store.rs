//! The metadata store.
//!
//! `MetaStore` maps normalized bucket paths to buckets of encoded values.
//! It never touches the filesystem itself; a filesystem wrapper keeps it in
//! step with structural changes through [`MetaStore::erase_bucket`],
//! [`MetaStore::erase_tree`], [`MetaStore::relocate_bucket`] and
//! [`MetaStore::relocate_tree`].

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::path::{is_descendant, normalize, rebase};
use crate::{Codec, Error, Result, Validator, Value};

/// Encoded values of one bucket, by key.
pub type Bucket = HashMap<String, Bytes>;

/// An ordered copy of every bucket and its encoded values.
///
/// This is what a persistence layer flushes and loads back.
pub type Snapshot = BTreeMap<String, BTreeMap<String, Bytes>>;

#[derive(Default)]
struct State {
    buckets: HashMap<String, Bucket>,
    dirty: bool,
}

impl State {
    /// Return the bucket at `path`, creating an empty one if needed.
    fn bucket_mut(&mut self, path: &str) -> &mut Bucket {
        self.buckets.entry(path.to_string()).or_default()
    }

    /// Take `path` and all of its descendants out of the map.
    fn drain_tree(&mut self, path: &str) -> Vec<(String, Bucket)> {
        let names: Vec<String> = self
            .buckets
            .keys()
            .filter(|k| k.as_str() == path || is_descendant(k, path))
            .cloned()
            .collect();
        names
            .into_iter()
            .filter_map(|name| self.buckets.remove_entry(&name))
            .collect()
    }

    /// Re-root `from` and its descendants under `to`, replacing whatever
    /// is at the destination paths. Returns how many buckets moved.
    fn relocate_tree(&mut self, from: &str, to: &str) -> usize {
        let moved = self.drain_tree(from);
        let count = moved.len();
        for (name, bucket) in moved {
            if let Some(target) = rebase(&name, from, to) {
                self.buckets.insert(target, bucket);
            }
        }
        self.dirty = true;
        count
    }
}

/// Path-addressed key/value metadata store.
///
/// Each operation checks an existing bucket and applies its change under a
/// single lock, so no caller can observe a half-finished
/// [`empty`](Self::empty) or [`move_bucket`](Self::move_bucket). Values are
/// encoded before the lock is taken. `MetaStore` is `Send + Sync` and can be
/// shared through an `Arc`.
///
/// # Example
///
/// ```rust
/// use metafile_core_store::{MetaStore, Value};
/// # use metafile_core_store::{Codec, Error};
/// # use bytes::Bytes;
/// # struct TextCodec;
/// # impl Codec for TextCodec {
/// #     fn encode(&self, v: &Value) -> Result<Bytes, Error> {
/// #         match v { Value::String(s) => Ok(Bytes::from(s.clone())), _ => Err(Error::encode("text", "not a string")) }
/// #     }
/// #     fn decode(&self, b: &Bytes) -> Result<Value, Error> {
/// #         Ok(Value::from(std::str::from_utf8(b).map_err(|e| Error::decode("text", e.to_string()))?))
/// #     }
/// #     fn name(&self) -> &'static str { "text" }
/// # }
///
/// let store = MetaStore::new("", TextCodec);
/// store.put("/docs/", "owner", &Value::from("alice")).unwrap();
/// assert_eq!(store.get("docs", "owner").unwrap(), Some(Value::from("alice")));
/// ```
pub struct MetaStore {
    base: String,
    state: Mutex<State>,
    validator: Option<Box<dyn Validator>>,
    codec: Box<dyn Codec>,
}

impl MetaStore {
    /// Create a store that trusts every bucket path.
    pub fn new(base: impl Into<String>, codec: impl Codec + 'static) -> Self {
        Self::builder(base, codec).build()
    }

    /// Create a store that gates new buckets through `validator`.
    pub fn with_validator(
        base: impl Into<String>,
        codec: impl Codec + 'static,
        validator: impl Validator + 'static,
    ) -> Self {
        Self::builder(base, codec).validator(validator).build()
    }

    /// Start building a store rooted at `base` that encodes with `codec`.
    pub fn builder(base: impl Into<String>, codec: impl Codec + 'static) -> MetaStoreBuilder {
        MetaStoreBuilder {
            base: base.into(),
            validator: None,
            codec: Box::new(codec),
        }
    }

    /// The fixed identifier the bucket paths are relative to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Name of the codec used for every value.
    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    /// Lock the store for an operation on a normalized bucket path, failing
    /// with `BadBucket` if the path is not valid.
    ///
    /// An existing bucket is always valid and is checked under the returned
    /// guard, so it cannot vanish before the caller mutates it. Otherwise the
    /// validator runs with the lock released, since it may stat the
    /// filesystem, and the guard is taken again once it has accepted the
    /// path.
    fn lock_valid(&self, bucket: &str) -> Result<MutexGuard<'_, State>> {
        let state = self.state.lock();
        if state.buckets.contains_key(bucket) {
            return Ok(state);
        }
        drop(state);

        if let Some(validator) = &self.validator {
            if !validator.is_valid(bucket) {
                warn!(bucket = %bucket, base = %self.base, "bucket rejected");
                return Err(Error::bad_bucket(bucket));
            }
        }
        Ok(self.state.lock())
    }

    /// Whether `path` is a usable bucket: already present, or accepted by the
    /// validator (or no validator is configured).
    pub fn is_valid(&self, path: &str) -> bool {
        self.lock_valid(&normalize(path)).is_ok()
    }

    /// Store `value` under `key` in the bucket at `path`.
    ///
    /// Overwrites any previous value for `key`. If encoding fails the store
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// `BadBucket` if the bucket is invalid; `Encode` if the codec rejects
    /// the value.
    pub fn put(&self, path: &str, key: &str, value: &Value) -> Result<()> {
        let bucket = normalize(path);
        let encoded = self.codec.encode(value)?;

        let mut state = self.lock_valid(&bucket)?;
        state.bucket_mut(&bucket).insert(key.to_string(), encoded);
        state.dirty = true;
        trace!(bucket = %bucket, key, "put");
        Ok(())
    }

    /// Fetch the value under `key` in the bucket at `path`.
    ///
    /// Returns `Ok(None)` if the key is absent. A valid bucket that has not
    /// been seen before is materialized empty.
    ///
    /// # Errors
    ///
    /// `BadBucket` if the bucket is invalid; `Decoding` naming the bucket and
    /// key if the stored bytes cannot be decoded.
    pub fn get(&self, path: &str, key: &str) -> Result<Option<Value>> {
        let bucket = normalize(path);

        let encoded = {
            let mut state = self.lock_valid(&bucket)?;
            match state.bucket_mut(&bucket).get(key) {
                Some(bytes) => bytes.clone(),
                None => return Ok(None),
            }
        };

        trace!(bucket = %bucket, key, "get");
        self.codec
            .decode(&encoded)
            .map(Some)
            .map_err(|e| e.at(&bucket, key))
    }

    /// Remove `key` from the bucket at `path`. An absent key is not an error.
    ///
    /// # Errors
    ///
    /// `BadBucket` if the bucket is invalid.
    pub fn delete(&self, path: &str, key: &str) -> Result<()> {
        let bucket = normalize(path);

        let mut state = self.lock_valid(&bucket)?;
        state.bucket_mut(&bucket).remove(key);
        state.dirty = true;
        trace!(bucket = %bucket, key, "delete");
        Ok(())
    }

    /// Remove the bucket at `path` and every bucket below it.
    ///
    /// Emptying `"foo"` removes `"foo"` and `"foo/bar"` but leaves
    /// `"foobar"` alone.
    ///
    /// # Errors
    ///
    /// `BadBucket` if the bucket is invalid.
    pub fn empty(&self, path: &str) -> Result<()> {
        let bucket = normalize(path);

        let mut state = self.lock_valid(&bucket)?;
        let removed = state.drain_tree(&bucket).len();
        state.dirty = true;
        debug!(bucket = %bucket, removed, "emptied bucket tree");
        Ok(())
    }

    /// Move the bucket at `path` and every bucket below it to `to`.
    ///
    /// Each descendant keeps its path relative to `path`. Existing buckets at
    /// the destination paths are replaced. If there is no bucket at `path`
    /// itself its descendants are still moved and the destination is left as
    /// it was. `to` is not validated: it mirrors a rename that has already
    /// happened.
    ///
    /// # Errors
    ///
    /// `BadBucket` if the source bucket is invalid.
    pub fn move_bucket(&self, path: &str, to: &str) -> Result<()> {
        let from = normalize(path);
        let to = normalize(to);

        let mut state = self.lock_valid(&from)?;
        let moved = state.relocate_tree(&from, &to);
        debug!(from = %from, to = %to, moved, "moved bucket tree");
        Ok(())
    }

    /// Drop exactly one bucket, leaving its descendants in place.
    ///
    /// Used when a file is created or truncated. The path is not validated:
    /// the erase either removes the bucket or does nothing.
    pub fn erase_bucket(&self, path: &str) {
        let bucket = normalize(path);
        let mut state = self.state.lock();
        let existed = state.buckets.remove(&bucket).is_some();
        state.dirty = true;
        debug!(bucket = %bucket, existed, "erased bucket");
    }

    /// Move exactly one bucket from `path` to `to`, leaving descendants in
    /// place. Neither path is validated. Nothing happens if there is no
    /// bucket at `path`.
    pub fn relocate_bucket(&self, path: &str, to: &str) {
        let from = normalize(path);
        let to = normalize(to);
        if from == to {
            return;
        }

        let mut state = self.state.lock();
        if let Some(bucket) = state.buckets.remove(&from) {
            state.buckets.insert(to.clone(), bucket);
            state.dirty = true;
            debug!(from = %from, to = %to, "relocated bucket");
        }
    }

    /// Move the bucket at `path` and all of its descendants to `to` without
    /// validating either path.
    pub fn relocate_tree(&self, path: &str, to: &str) {
        let from = normalize(path);
        let to = normalize(to);

        let moved = self.state.lock().relocate_tree(&from, &to);
        debug!(from = %from, to = %to, moved, "relocated bucket tree");
    }

    /// Drop the bucket at `path` and every bucket below it without
    /// validating the path.
    ///
    /// Used once the path is already gone from the filesystem, when a
    /// validator that stats the path would reject it.
    pub fn erase_tree(&self, path: &str) {
        let bucket = normalize(path);
        let mut state = self.state.lock();
        let removed = state.drain_tree(&bucket).len();
        state.dirty = true;
        debug!(bucket = %bucket, removed, "erased bucket tree");
    }

    /// True once anything has changed since creation or the last
    /// [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// Clear the dirty flag after the contents have been persisted.
    pub fn mark_clean(&self) {
        self.state.lock().dirty = false;
    }

    /// Whether a bucket is materialized at `path`.
    pub fn contains_bucket(&self, path: &str) -> bool {
        self.state.lock().buckets.contains_key(&normalize(path))
    }

    /// Number of materialized buckets.
    pub fn bucket_count(&self) -> usize {
        self.state.lock().buckets.len()
    }

    /// Number of keys in the bucket at `path`; `0` if there is no bucket.
    pub fn len(&self, path: &str) -> usize {
        self.state
            .lock()
            .buckets
            .get(&normalize(path))
            .map_or(0, HashMap::len)
    }

    /// Sorted keys of the bucket at `path`.
    pub fn keys(&self, path: &str) -> Vec<String> {
        let state = self.state.lock();
        let mut keys: Vec<String> = state
            .buckets
            .get(&normalize(path))
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Copy out every bucket and its encoded values.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        state
            .buckets
            .iter()
            .map(|(name, bucket)| {
                let values = bucket
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (name.clone(), values)
            })
            .collect()
    }

    /// Replace the contents with `snapshot` and clear the dirty flag.
    ///
    /// Bucket names are normalized on the way in.
    pub fn load(&self, snapshot: Snapshot) {
        let buckets: HashMap<String, Bucket> = snapshot
            .into_iter()
            .map(|(name, values)| (normalize(&name), values.into_iter().collect()))
            .collect();

        let mut state = self.state.lock();
        state.buckets = buckets;
        state.dirty = false;
        debug!(buckets = state.buckets.len(), "loaded snapshot");
    }
}

impl std::fmt::Debug for MetaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MetaStore")
            .field("base", &self.base)
            .field("buckets", &state.buckets.len())
            .field("dirty", &state.dirty)
            .field("validator", &self.validator.is_some())
            .field("codec", &self.codec.name())
            .finish()
    }
}

/// Builder for [`MetaStore`], for call sites where the validator is
/// decided at runtime.
pub struct MetaStoreBuilder {
    base: String,
    validator: Option<Box<dyn Validator>>,
    codec: Box<dyn Codec>,
}

impl MetaStoreBuilder {
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Set or clear the validator.
    #[must_use]
    pub fn maybe_validator(mut self, validator: Option<Box<dyn Validator>>) -> Self {
        self.validator = validator;
        self
    }

    pub fn build(self) -> MetaStore {
        MetaStore {
            base: self.base,
            state: Mutex::new(State::default()),
            validator: self.validator,
            codec: self.codec,
        }
    }
}
