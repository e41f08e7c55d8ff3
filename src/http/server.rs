//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Answer unknown routes and unsupported methods with JSON envelopes
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::extract::FromRef;
use axum::http::{Method, Request};
use axum::middleware;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::data::{Clock, MovieStore, SystemClock};
use crate::http::error::ApiError;
use crate::http::healthcheck::healthcheck;
use crate::http::movies::{create_movie, delete_movie, show_movie, update_movie};
use crate::jsonio::JsonDecoder;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub decoder: JsonDecoder,
    pub movies: Arc<dyn MovieStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<ApiConfig>,
}

impl FromRef<AppState> for JsonDecoder {
    fn from_ref(state: &AppState) -> Self {
        state.decoder
    }
}

/// HTTP server for the movie API.
pub struct ApiServer {
    router: Router,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Create a new server backed by `movies`, judging release years
    /// against the system clock.
    pub fn new(config: ApiConfig, movies: Arc<dyn MovieStore>) -> Self {
        Self::with_clock(config, movies, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: ApiConfig,
        movies: Arc<dyn MovieStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            decoder: JsonDecoder::new(config.limits.max_body_bytes),
            movies,
            clock,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ApiConfig, state: AppState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        });

        Router::new()
            .route("/v1/healthcheck", get(healthcheck))
            .route("/v1/movies", post(create_movie))
            .route(
                "/v1/movies/{id}",
                get(show_movie).patch(update_movie).delete(delete_movie),
            )
            .fallback(not_found)
            .method_not_allowed_fallback(method_not_allowed)
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
            .layer(trace)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.server.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

/// The timeout drops the handler future, body read included, and surfaces
/// as an error; answer it with the usual envelope.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        ApiError::RequestTimeout
    } else {
        ApiError::Internal(err.to_string())
    }
}
