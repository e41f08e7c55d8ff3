//! Bounded, strict request body decoding.
//!
//! # Responsibilities
//! - Cap the number of body bytes read
//! - Parse exactly one JSON value
//! - Bind it into the destination, rejecting unknown keys
//! - Classify every client-caused failure into [`DecodeError`]
//!
//! # Design Decisions
//! - The cap is enforced while the body streams in, never after buffering
//! - Classification uses serde_json's error category and the binder's
//!   structured errors, never message text
//! - A destination that cannot be decoded into at all is a programmer
//!   error and panics instead of producing a client response

use std::any::type_name;
use std::io::Read;

use axum::body::Body;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::Value;
use thiserror::Error;

use crate::jsonio::strict::{self, BindError};

/// Default request body cap (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

/// Client-caused body decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Syntax error at a 1-based byte position, or truncated input (`None`).
    #[error("body contains badly-formed JSON{}", at_character(.offset))]
    MalformedJson { offset: Option<usize> },

    /// `offset` is the position of the top-level value, used when no field
    /// can be named.
    #[error("body contains incorrect JSON type {}", type_location(.field, .offset))]
    TypeMismatch { field: Option<String>, offset: usize },

    #[error("body must not be empty")]
    EmptyBody,

    #[error("body contains unknown key \"{name}\"")]
    UnknownField { name: String },

    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("body must only contain a single JSON value")]
    MultipleJsonValues,

    /// A field's scalar codec rejected the value.
    #[error("body contains invalid value{}: {message}", for_field(.field))]
    InvalidValue { field: Option<String>, message: String },

    #[error("body could not be read: {message}")]
    Unreadable { message: String },
}

fn at_character(offset: &Option<usize>) -> String {
    offset
        .map(|offset| format!(" (at character {offset})"))
        .unwrap_or_default()
}

fn type_location(field: &Option<String>, offset: &usize) -> String {
    match field {
        Some(field) => format!("for field \"{field}\""),
        None => format!("(at character {offset})"),
    }
}

fn for_field(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|field| format!(" for field \"{field}\""))
        .unwrap_or_default()
}

/// Decodes request bodies under a fixed size cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonDecoder {
    max_bytes: usize,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_BYTES)
    }
}

impl JsonDecoder {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stream an HTTP body, failing as soon as it outgrows the cap.
    pub async fn decode_body<T: DeserializeOwned>(&self, body: Body) -> Result<T, DecodeError> {
        let mut stream = body.into_data_stream();
        let mut buf = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| DecodeError::Unreadable {
                message: err.to_string(),
            })?;
            if buf.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large());
            }
            buf.extend_from_slice(&chunk);
        }

        self.decode_slice(&buf)
    }

    /// Decode from a blocking reader; at most `max_bytes + 1` bytes are read.
    pub fn decode_reader<T: DeserializeOwned, R: Read>(
        &self,
        reader: R,
    ) -> Result<T, DecodeError> {
        let mut buf = Vec::new();
        reader
            .take((self.max_bytes as u64).saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(|err| DecodeError::Unreadable {
                message: err.to_string(),
            })?;
        self.decode_slice(&buf)
    }

    /// Decode a complete body.
    ///
    /// # Panics
    /// If `T` is not a JSON object schema (for example a bare `String` or
    /// `Vec`), or its `Deserialize` impl misuses the map protocol.
    pub fn decode_slice<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, DecodeError> {
        if body.len() > self.max_bytes {
            return Err(self.too_large());
        }

        let Some(start) = body.iter().position(|b| !is_json_whitespace(*b)) else {
            return Err(DecodeError::EmptyBody);
        };

        let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
        let value = match values.next() {
            Some(Ok(value)) => value,
            Some(Err(err)) => return Err(classify_syntax(body, &err)),
            None => return Err(DecodeError::EmptyBody),
        };

        let decoded =
            strict::from_value::<T>(value).map_err(|err| classify_bind::<T>(err, start + 1))?;

        if values.next().is_some() {
            return Err(DecodeError::MultipleJsonValues);
        }

        Ok(decoded)
    }

    fn too_large(&self) -> DecodeError {
        DecodeError::BodyTooLarge {
            limit: self.max_bytes,
        }
    }
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn classify_syntax(body: &[u8], err: &serde_json::Error) -> DecodeError {
    match err.classify() {
        Category::Eof => DecodeError::MalformedJson { offset: None },
        Category::Syntax | Category::Data | Category::Io => {
            let offset = byte_offset(body, err.line(), err.column());
            if exceeds_nesting_limit(body, offset) {
                DecodeError::TypeMismatch {
                    field: None,
                    offset,
                }
            } else {
                DecodeError::MalformedJson {
                    offset: Some(offset),
                }
            }
        }
    }
}

/// serde_json refuses to parse past this many nested arrays/objects.
const MAX_NESTING: usize = 128;

/// True when the error at 1-based `offset` sits on an opening bracket at
/// serde_json's nesting limit: the JSON is well-formed, just too deep for
/// any destination this decoder binds.
fn exceeds_nesting_limit(body: &[u8], offset: usize) -> bool {
    let index = offset.saturating_sub(1);
    matches!(body.get(index), Some(b'[' | b'{'))
        && nesting_depth(&body[..index]) + 1 >= MAX_NESTING
}

/// Open brackets at the end of `prefix`, ignoring brackets inside strings.
fn nesting_depth(prefix: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in prefix {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// serde_json counts columns in bytes, so line + column maps back to the
/// 1-based byte position.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split_inclusive(|b| *b == b'\n')
        .take(line.saturating_sub(1))
        .map(<[u8]>::len)
        .sum();
    line_start + column
}

fn classify_bind<T>(err: BindError, value_position: usize) -> DecodeError {
    match err {
        BindError::UnknownField(name) => DecodeError::UnknownField { name },
        BindError::TypeMismatch { field } => DecodeError::TypeMismatch {
            field,
            offset: value_position,
        },
        BindError::InvalidValue { field, message } => DecodeError::InvalidValue { field, message },
        err @ (BindError::Discarded | BindError::InvalidTarget(_)) => {
            panic!("invalid decode destination `{}`: {err}", type_name::<T>())
        }
    }
}
