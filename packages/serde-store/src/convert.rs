//! Conversions between Value and serde types.

use base64::Engine;
use metafile_core_store::{Error, Value};
use serde::de::DeserializeOwned;
use serde::ser::{self, Serializer};
use serde::Serialize;

/// Object key that marks a base64-encoded `Value::Bytes` in JSON.
pub(crate) const BYTES_TAG: &str = "$base64";

const SERDE: &str = "serde";

/// Convert a Value to a Rust type via serde.
///
/// Fails if the value does not have the shape `T` expects: a string read as
/// an integer, a float read as an integer, an integer out of range for `T`,
/// a struct with missing fields.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    // Convert Value to serde_json::Value first, then deserialize
    let json = value_to_json(value);
    serde_json::from_value(json).map_err(|e| Error::decode(SERDE, e.to_string()))
}

/// Convert a Rust type to a Value via serde.
///
/// Fails on NaN and infinite floats: JSON has no spelling for them and would
/// store `null` instead.
pub fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value, Error> {
    data.serialize(FiniteFloats)
        .map_err(|e| Error::encode(SERDE, e.to_string()))?;
    // Serialize to serde_json::Value first, then convert to Value
    let json = serde_json::to_value(data).map_err(|e| Error::encode(SERDE, e.to_string()))?;
    Ok(json_to_value(json))
}

/// Convert our Value to serde_json::Value.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::UInteger(u) => serde_json::Value::Number(u.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Bytes(b) => {
            // JSON has no bytes; wrap base64 in a tagged object so decode
            // can tell it apart from a plain string
            let encoded = base64::engine::general_purpose::STANDARD.encode(&b);
            let mut tagged = serde_json::Map::new();
            tagged.insert(BYTES_TAG.to_string(), serde_json::Value::String(encoded));
            serde_json::Value::Object(tagged)
        }
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInteger(u)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for very large numbers
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => {
            if let Some(bytes) = tagged_bytes(&map) {
                return Value::Bytes(bytes);
            }
            Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, json_to_value(v)))
                    .collect(),
            )
        }
    }
}

/// First NaN or infinite float inside `value`, if any.
pub(crate) fn non_finite(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) if !f.is_finite() => Some(*f),
        Value::Array(items) => items.iter().find_map(non_finite),
        Value::Map(map) => map.values().find_map(non_finite),
        _ => None,
    }
}

fn tagged_bytes(map: &serde_json::Map<String, serde_json::Value>) -> Option<Vec<u8>> {
    if map.len() != 1 {
        return None;
    }
    let encoded = map.get(BYTES_TAG)?.as_str()?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()
}

type Walk = std::result::Result<(), serde_json::Error>;

fn finite(v: f64) -> Walk {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ser::Error::custom(format!("cannot store non-finite float {v}")))
    }
}

/// Serializer that produces nothing and only rejects non-finite floats.
struct FiniteFloats;

impl Serializer for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Walk {
        Ok(())
    }
    fn serialize_i8(self, _: i8) -> Walk {
        Ok(())
    }
    fn serialize_i16(self, _: i16) -> Walk {
        Ok(())
    }
    fn serialize_i32(self, _: i32) -> Walk {
        Ok(())
    }
    fn serialize_i64(self, _: i64) -> Walk {
        Ok(())
    }
    fn serialize_i128(self, _: i128) -> Walk {
        Ok(())
    }
    fn serialize_u8(self, _: u8) -> Walk {
        Ok(())
    }
    fn serialize_u16(self, _: u16) -> Walk {
        Ok(())
    }
    fn serialize_u32(self, _: u32) -> Walk {
        Ok(())
    }
    fn serialize_u64(self, _: u64) -> Walk {
        Ok(())
    }
    fn serialize_u128(self, _: u128) -> Walk {
        Ok(())
    }
    fn serialize_f32(self, v: f32) -> Walk {
        finite(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Walk {
        finite(v)
    }
    fn serialize_char(self, _: char) -> Walk {
        Ok(())
    }
    fn serialize_str(self, _: &str) -> Walk {
        Ok(())
    }
    fn serialize_bytes(self, _: &[u8]) -> Walk {
        Ok(())
    }
    fn serialize_none(self) -> Walk {
        Ok(())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Walk {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Walk {
        Ok(())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Walk {
        Ok(())
    }
    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Walk {
        Ok(())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _: &'static str, value: &T) -> Walk {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Walk {
        value.serialize(self)
    }
    fn serialize_seq(self, _: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
    fn serialize_tuple(self, _: usize) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
    fn serialize_map(self, _: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
}

macro_rules! walk_elements {
    ($($trait:ident::$method:ident),* $(,)?) => {
        $(
            impl ser::$trait for FiniteFloats {
                type Ok = ();
                type Error = serde_json::Error;

                fn $method<T: ?Sized + Serialize>(&mut self, value: &T) -> Walk {
                    value.serialize(FiniteFloats)
                }

                fn end(self) -> Walk {
                    Ok(())
                }
            }
        )*
    };
}

walk_elements!(
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
);

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Walk {
        key.serialize(FiniteFloats)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> Walk {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Walk {
        Ok(())
    }
}
