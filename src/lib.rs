//! Greenlight movie catalog API library.

pub mod config;
pub mod data;
pub mod http;
pub mod jsonio;
pub mod lifecycle;
pub mod observability;
pub mod validator;

pub use config::ApiConfig;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
