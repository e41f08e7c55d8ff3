//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout, metrics)
//!     → extract.rs (strict JSON body → typed input)
//!     → movies.rs / healthcheck.rs (handlers)
//!     → jsonio::write_json (tab-indented envelope)
//!     → error.rs (any failure → {"error": ...})
//! ```

pub mod error;
pub mod extract;
pub mod healthcheck;
pub mod movies;
pub mod server;

pub use error::ApiError;
pub use extract::{MovieId, StrictJson};
pub use server::{ApiServer, AppState};
