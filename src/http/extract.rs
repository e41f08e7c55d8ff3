//! Request extractors that reject with [`ApiError`] envelopes.

use axum::extract::{FromRef, FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::http::error::ApiError;
use crate::jsonio::JsonDecoder;

/// Like `axum::Json`, but decoded through [`JsonDecoder`]: unknown keys,
/// trailing values and oversized bodies are rejected with a 400 envelope.
///
/// Must be the last extractor of a handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    JsonDecoder: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let decoder = JsonDecoder::from_ref(state);
        let value = decoder.decode_body(req.into_body()).await?;
        Ok(StrictJson(value))
    }
}

/// The `{id}` path segment of a movie route.
///
/// Anything but a positive integer, including a segment that does not
/// percent-decode to UTF-8, is a 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieId(pub i64);

impl<S> FromRequestParts<S> for MovieId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;
        read_id_param(&raw).map(MovieId)
    }
}

/// Parse an id segment. Anything but a positive integer is a 404.
pub fn read_id_param(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::NotFound),
    }
}
