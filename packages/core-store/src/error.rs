//! Error types for the core store.

use thiserror::Error;

/// Errors surfaced by the metadata store and its codecs.
///
/// Every variant is recoverable: the store is never left in a partially
/// updated state when one of these is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The bucket is neither materialized in the store nor accepted by the
    /// validator.
    #[error("bucket does not exist: '{bucket}'")]
    BadBucket { bucket: String },

    /// A stored value could not be decoded into the requested type.
    #[error("decoding `{bucket}[{key}]`: {message}")]
    Decoding {
        bucket: String,
        key: String,
        message: String,
    },

    /// The codec failed to encode a value.
    #[error("encode error ({codec}): {message}")]
    Encode { codec: &'static str, message: String },

    /// The codec failed to decode bytes.
    #[error("decode error ({codec}): {message}")]
    Decode { codec: &'static str, message: String },
}

impl Error {
    pub fn bad_bucket(bucket: impl Into<String>) -> Self {
        Error::BadBucket {
            bucket: bucket.into(),
        }
    }

    pub fn encode(codec: &'static str, message: impl Into<String>) -> Self {
        Error::Encode {
            codec,
            message: message.into(),
        }
    }

    pub fn decode(codec: &'static str, message: impl Into<String>) -> Self {
        Error::Decode {
            codec,
            message: message.into(),
        }
    }

    /// Attach the bucket and key a decode failure happened at.
    pub fn at(self, bucket: &str, key: &str) -> Self {
        match self {
            Error::Decoding { .. } | Error::BadBucket { .. } => self,
            other => Error::Decoding {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// True for the "bucket does not exist" condition.
    pub fn is_bad_bucket(&self) -> bool {
        matches!(self, Error::BadBucket { .. })
    }
}

/// Result alias for core store operations.
pub type Result<T> = std::result::Result<T, Error>;
