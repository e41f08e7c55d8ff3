//! HTTP-facing errors and their responses.
//!
//! Every failure a handler can produce ends up here and leaves as an
//! `{"error": ...}` envelope.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;

use crate::data::StoreError;
use crate::jsonio::{write_json, DecodeError, Envelope, ResponseError};

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    BadRequest(#[from] DecodeError),

    #[error("validation failed")]
    FailedValidation(BTreeMap<String, String>),

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),

    #[error("the request took too long to complete")]
    RequestTimeout,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::FailedValidation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value placed under the `"error"` key.
    fn detail(&self) -> Value {
        match self {
            ApiError::FailedValidation(errors) => Value::Object(
                errors
                    .iter()
                    .map(|(field, message)| (field.clone(), Value::String(message.clone())))
                    .collect(),
            ),
            // Internal details are logged, never sent.
            ApiError::Internal(_) => Value::String(SERVER_ERROR_MESSAGE.to_string()),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ResponseError> for ApiError {
    fn from(err: ResponseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(cause) = &self {
            tracing::error!(error = %cause, "Request failed");
        }

        let envelope = Envelope::new().with("error", self.detail());
        match envelope.and_then(|body| write_json(status, &body, HeaderMap::new())) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to write error response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_decode_error_is_bad_request() {
        let response = ApiError::from(DecodeError::EmptyBody).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "body must not be empty"})
        );
    }

    #[tokio::test]
    async fn test_validation_errors_are_an_object() {
        let mut errors = BTreeMap::new();
        errors.insert("title".to_string(), "must be provided".to_string());
        errors.insert("year".to_string(), "must be provided".to_string());

        let response = ApiError::FailedValidation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": {"title": "must be provided", "year": "must be provided"}})
        );
    }

    #[tokio::test]
    async fn test_store_errors_map_by_variant() {
        let response = ApiError::from(StoreError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], NOT_FOUND_MESSAGE);

        let conflict = StoreError::EditConflict { id: 1, expected: 1, actual: 2 };
        let response = ApiError::from(conflict).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], SERVER_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_method_not_allowed_names_method() {
        let response = ApiError::MethodNotAllowed(Method::PUT).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await["error"],
            "the PUT method is not supported for this resource"
        );
    }
}
