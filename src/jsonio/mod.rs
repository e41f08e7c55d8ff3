//! Strict JSON I/O between HTTP bodies and typed values.
//!
//! # Data Flow
//! ```text
//! request body (bounded stream)
//!     → decode.rs (size cap, single value, error taxonomy)
//!     → strict.rs (bind into destination, reject unknown keys)
//!     → typed input (Patch<T> fields)
//!
//! handler result
//!     → encode.rs (Envelope, tab-indented JSON, headers)
//!     → HTTP response
//! ```

pub mod decode;
pub mod encode;
pub mod patch;
mod strict;

pub use decode::{DecodeError, JsonDecoder, DEFAULT_MAX_BODY_BYTES};
pub use encode::{to_indented_json, write_json, Envelope, ResponseError};
pub use patch::Patch;
