//! Core traits: Codec and Validator.

use bytes::Bytes;

use crate::{Error, Value};

/// Codec for converting between Value and the opaque bytes held in a bucket.
///
/// A codec must be stateless: the store may call it from any thread, and
/// does so without holding its lock.
///
/// # Implementing Custom Codecs
///
/// ```rust
/// use metafile_core_store::{Codec, Error, Value};
/// use bytes::Bytes;
///
/// struct TextCodec;
///
/// impl Codec for TextCodec {
///     fn encode(&self, value: &Value) -> Result<Bytes, Error> {
///         match value {
///             Value::String(s) => Ok(Bytes::from(s.clone())),
///             other => Err(Error::encode(self.name(), format!("cannot encode {}", other.kind()))),
///         }
///     }
///
///     fn decode(&self, bytes: &Bytes) -> Result<Value, Error> {
///         std::str::from_utf8(bytes)
///             .map(Value::from)
///             .map_err(|e| Error::decode(self.name(), e.to_string()))
///     }
///
///     fn name(&self) -> &'static str {
///         "text"
///     }
/// }
/// ```
pub trait Codec: Send + Sync {
    /// Encode a Value into self-describing bytes.
    fn encode(&self, value: &Value) -> Result<Bytes, Error>;

    /// Decode bytes produced by `encode` back into a Value.
    fn decode(&self, bytes: &Bytes) -> Result<Value, Error>;

    /// Short name used in error messages.
    fn name(&self) -> &'static str;
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        (**self).encode(value)
    }

    fn decode(&self, bytes: &Bytes) -> Result<Value, Error> {
        (**self).decode(bytes)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Decides whether a bucket that is not yet in the store may be created.
///
/// The store only consults the validator for buckets it has not seen; an
/// existing bucket is always valid. Implementations may touch the
/// filesystem, so the store calls them outside its lock.
///
/// Any `Fn(&str) -> bool` closure is a validator:
///
/// ```rust
/// use metafile_core_store::Validator;
///
/// let only_docs = |bucket: &str| bucket.starts_with("docs");
/// assert!(only_docs.is_valid("docs/readme"));
/// assert!(!only_docs.is_valid("src"));
/// ```
pub trait Validator: Send + Sync {
    /// Check a normalized bucket path.
    fn is_valid(&self, bucket: &str) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, bucket: &str) -> bool {
        self(bucket)
    }
}
