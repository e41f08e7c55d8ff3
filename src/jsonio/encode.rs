//! JSON response envelopes and the response writer.
//!
//! # Design Decisions
//! - Bodies are fully serialized before a response exists, so a failed
//!   serialization never leaves a half-written status line or payload
//! - Output is tab-indented; it is the documented wire format

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level response object, keyed by payload kind (`"movie"`, `"error"`, ...).
///
/// Keys serialize in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope(BTreeMap<String, Value>);

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-key envelope such as `{"movie": {...}}`.
    pub fn wrap(key: impl Into<String>, value: impl Serialize) -> Result<Self, ResponseError> {
        Self::new().with(key, value)
    }

    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Serialize,
    ) -> Result<Self, ResponseError> {
        self.0.insert(key.into(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Serialize `value` as tab-indented JSON.
pub fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ResponseError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Build a JSON response.
///
/// Caller headers replace same-named headers; `Content-Type` is always
/// `application/json`.
pub fn write_json<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    headers: HeaderMap,
) -> Result<Response, ResponseError> {
    let payload = to_indented_json(body)?;

    let mut response = Response::new(Body::from(payload));
    response.headers_mut().extend(headers);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *response.status_mut() = status;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use serde_json::json;
    use std::collections::HashMap;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_tab_indented_output() {
        let envelope = Envelope::wrap("message", "movie successfully deleted").unwrap();
        let response = write_json(StatusCode::OK, &envelope, HeaderMap::new()).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "{\n\t\"message\": \"movie successfully deleted\"\n}"
        );
    }

    #[tokio::test]
    async fn test_nested_output_is_deterministic() {
        let envelope = Envelope::new()
            .with("system_info", json!({"environment": "development", "version": "1.0.0"}))
            .unwrap()
            .with("status", "available")
            .unwrap();
        let write = || write_json(StatusCode::OK, &envelope, HeaderMap::new()).unwrap();
        let first = body_string(write()).await;
        let second = body_string(write()).await;

        assert_eq!(first, second);
        assert_eq!(
            first,
            "{\n\t\"status\": \"available\",\n\t\"system_info\": {\n\t\t\"environment\": \"development\",\n\t\t\"version\": \"1.0.0\"\n\t}\n}"
        );
    }

    #[test]
    fn test_headers_applied_and_content_type_forced() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/v1/movies/1"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.append("x-trace", HeaderValue::from_static("a"));
        headers.append("x-trace", HeaderValue::from_static("b"));

        let envelope = Envelope::wrap("movie", json!({"id": 1})).unwrap();
        let response = write_json(StatusCode::CREATED, &envelope, headers).unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[LOCATION], "/v1/movies/1");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers().get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(response.headers().get_all("x-trace").iter().count(), 2);
    }

    #[test]
    fn test_serialization_failure_is_reported() {
        // JSON object keys must be strings.
        let mut bad = HashMap::new();
        bad.insert((1, 2), "x");

        assert!(write_json(StatusCode::OK, &bad, HeaderMap::new()).is_err());
        assert!(Envelope::wrap("movie", &bad).is_err());
    }
}
