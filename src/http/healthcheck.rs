//! Liveness endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::jsonio::{write_json, Envelope};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
struct SystemInfo {
    environment: String,
    version: &'static str,
}

pub async fn healthcheck(State(state): State<AppState>) -> Result<Response, ApiError> {
    let info = SystemInfo {
        environment: state.config.server.environment.to_string(),
        version: VERSION,
    };
    let envelope = Envelope::new()
        .with("status", "available")?
        .with("system_info", info)?;
    Ok(write_json(StatusCode::OK, &envelope, HeaderMap::new())?)
}
