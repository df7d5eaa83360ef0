//! JSON codec implementation.

use bytes::Bytes;
use metafile_core_store::{Codec, Error, Value};

use crate::convert::{json_to_value, non_finite, value_to_json};

/// A codec that stores values as JSON.
///
/// This is the default codec. JSON keeps the shape of the value next to its
/// data, so a stored value can only be read back into a compatible type.
/// NaN and infinite floats have no JSON form and fail to encode.
///
/// # Example
///
/// ```rust
/// use metafile_serde_store::JsonCodec;
/// use metafile_core_store::{Codec, Value};
///
/// let codec = JsonCodec;
/// let value = Value::from("hello");
///
/// let bytes = codec.encode(&value).unwrap();
/// let decoded = codec.decode(&bytes).unwrap();
///
/// assert_eq!(decoded, value);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Bytes, Error> {
        if let Some(f) = non_finite(value) {
            return Err(Error::encode(self.name(), format!("non-finite float {f}")));
        }
        let json = value_to_json(value.clone());
        let bytes = serde_json::to_vec(&json).map_err(|e| Error::encode(self.name(), e.to_string()))?;
        Ok(Bytes::from(bytes))
    }

    fn decode(&self, bytes: &Bytes) -> Result<Value, Error> {
        let json: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| Error::decode(self.name(), e.to_string()))?;
        Ok(json_to_value(json))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
