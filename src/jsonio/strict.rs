//! Strict binding of a parsed JSON tree into a typed destination.
//!
//! The destination's `Deserialize` impl drives a deserializer over
//! `serde_json::Value` whose error type records *why* binding failed
//! (unknown key, wrong JSON type, rejected scalar) as data, so callers
//! never inspect error text.
//!
//! Unknown keys are rejected for every destination: types with
//! `deny_unknown_fields` report them through `de::Error::unknown_field`,
//! other types try to skip them with `IgnoredAny`, which is refused here.

use std::fmt;

use serde::de::value::{StrDeserializer, StringDeserializer};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, Expected, MapAccess, SeqAccess,
    Unexpected, Visitor,
};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Why a parsed value could not be bound to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum BindError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// The destination asked to skip a value; resolved to `UnknownField`
    /// by the enclosing object.
    #[error("value discarded by destination")]
    Discarded,

    #[error("incorrect JSON type")]
    TypeMismatch { field: Option<String> },

    #[error("{message}")]
    InvalidValue { field: Option<String>, message: String },

    /// The destination type cannot be a strict decode target.
    #[error("{0}")]
    InvalidTarget(&'static str),
}

impl BindError {
    /// Attribute the error to object key `key`.
    fn within(self, key: &str) -> Self {
        match self {
            BindError::Discarded => BindError::UnknownField(key.to_owned()),
            BindError::TypeMismatch { field } => BindError::TypeMismatch {
                field: Some(qualify(key, field)),
            },
            BindError::InvalidValue { field, message } => BindError::InvalidValue {
                field: Some(qualify(key, field)),
                message,
            },
            other => other,
        }
    }
}

fn qualify(key: &str, inner: Option<String>) -> String {
    match inner {
        Some(inner) => format!("{key}.{inner}"),
        None => key.to_owned(),
    }
}

impl de::Error for BindError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        BindError::InvalidValue {
            field: None,
            message: msg.to_string(),
        }
    }

    fn invalid_type(_unexp: Unexpected<'_>, _exp: &dyn Expected) -> Self {
        BindError::TypeMismatch { field: None }
    }

    // Out-of-range numbers land here (e.g. 3000000000 for an i32).
    fn invalid_value(_unexp: Unexpected<'_>, _exp: &dyn Expected) -> Self {
        BindError::TypeMismatch { field: None }
    }

    fn invalid_length(_len: usize, _exp: &dyn Expected) -> Self {
        BindError::TypeMismatch { field: None }
    }

    fn unknown_field(field: &str, _expected: &'static [&'static str]) -> Self {
        BindError::UnknownField(field.to_owned())
    }
}

/// Bind a top-level JSON value into `T`, which must be an object schema.
pub(crate) fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, BindError> {
    T::deserialize(RootDeserializer { value })
}

/// Accepts only object-shaped destinations.
struct RootDeserializer {
    value: Value,
}

impl<'de> Deserializer<'de> for RootDeserializer {
    type Error = BindError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BindError> {
        Err(BindError::InvalidTarget(
            "destination is not a JSON object schema",
        ))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BindError> {
        ValueDeserializer::new(self.value).deserialize_struct(name, fields, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        match self.value {
            Value::Object(map) => visit_object(map, visitor),
            _ => Err(BindError::TypeMismatch { field: None }),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BindError> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq tuple tuple_struct enum
        identifier ignored_any
    }
}

struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    fn new(value: Value) -> Self {
        Self { value }
    }
}

impl<'de> Deserializer<'de> for ValueDeserializer {
    type Error = BindError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => visit_number(n, visitor),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visit_array(items, visitor),
            Value::Object(map) => visit_object(map, visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BindError> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BindError> {
        visitor.visit_newtype_struct(self)
    }

    // Derived struct visitors also accept arrays; JSON objects only here.
    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BindError> {
        match self.value {
            Value::Object(map) => visit_object(map, visitor),
            _ => Err(BindError::TypeMismatch { field: None }),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BindError> {
        match self.value {
            Value::String(variant) => {
                visitor.visit_enum(StringDeserializer::<BindError>::new(variant))
            }
            _ => Err(BindError::TypeMismatch { field: None }),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BindError> {
        Err(BindError::Discarded)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
    }
}

fn visit_number<'de, V: Visitor<'de>>(number: Number, visitor: V) -> Result<V::Value, BindError> {
    if let Some(n) = number.as_u64() {
        visitor.visit_u64(n)
    } else if let Some(n) = number.as_i64() {
        visitor.visit_i64(n)
    } else {
        match number.as_f64() {
            Some(n) => visitor.visit_f64(n),
            None => Err(BindError::TypeMismatch { field: None }),
        }
    }
}

fn visit_array<'de, V: Visitor<'de>>(items: Vec<Value>, visitor: V) -> Result<V::Value, BindError> {
    let mut access = ArrayAccess {
        items: items.into_iter(),
    };
    let value = visitor.visit_seq(&mut access)?;
    if access.items.as_slice().is_empty() {
        Ok(value)
    } else {
        Err(BindError::TypeMismatch { field: None })
    }
}

fn visit_object<'de, V: Visitor<'de>>(
    map: Map<String, Value>,
    visitor: V,
) -> Result<V::Value, BindError> {
    let mut access = ObjectAccess {
        entries: map.into_iter(),
        pending: None,
    };
    let value = visitor.visit_map(&mut access)?;
    // Entries the destination never asked for count as unknown keys.
    match access.entries.next() {
        Some((key, _)) => Err(BindError::UnknownField(key)),
        None => Ok(value),
    }
}

struct ArrayAccess {
    items: std::vec::IntoIter<Value>,
}

impl<'de> SeqAccess<'de> for ArrayAccess {
    type Error = BindError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, BindError> {
        self.items
            .next()
            .map(|item| seed.deserialize(ValueDeserializer::new(item)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct ObjectAccess {
    entries: serde_json::map::IntoIter,
    pending: Option<(String, Value)>,
}

impl<'de> MapAccess<'de> for ObjectAccess {
    type Error = BindError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, BindError> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        let decoded = seed.deserialize(StrDeserializer::<BindError>::new(&key))?;
        self.pending = Some((key, value));
        Ok(Some(decoded))
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, BindError> {
        let (key, value) = self.pending.take().ok_or(BindError::InvalidTarget(
            "destination requested an object value before its key",
        ))?;
        seed.deserialize(ValueDeserializer::new(value))
            .map_err(|err| err.within(&key))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}
