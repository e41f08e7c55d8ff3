//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, status
//! - `api_request_duration_seconds` (histogram): latency distribution
//!
//! Without an installed recorder the macros are no-ops, so handlers and
//! tests run the same code path whether or not the exporter is enabled.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("api_requests_total", &labels).increment(1);
    metrics::histogram!("api_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Middleware recording every request's outcome.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start);
    response
}
